//! Navigation seam
//!
//! The HTTP client and the auth session need to send the user to the login
//! view without knowing what hosts them (a browser tab, a terminal, a test).

use std::sync::Mutex;

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// Path of the landing view after a successful login
pub const HOME_PATH: &str = "/";

/// Host-provided view switching
pub trait Navigator: Send + Sync {
    /// Path of the view currently shown
    fn current_path(&self) -> String;

    /// Switch to the view at `path`
    fn navigate(&self, path: &str);

    /// Whether the login view is currently shown
    fn on_login_view(&self) -> bool {
        self.current_path().starts_with(LOGIN_PATH)
    }
}

/// Navigator that never moves
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_path(&self) -> String {
        HOME_PATH.to_string()
    }

    fn navigate(&self, _path: &str) {}
}

/// In-memory navigator that remembers every navigation
#[derive(Debug)]
pub struct RecordingNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Start on the view at `path`
    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(path.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every path navigated to, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Change the current view without recording a navigation
    pub fn set_current(&self, path: impl Into<String>) {
        if let Ok(mut current) = self.current.lock() {
            *current = path.into();
        }
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::starting_at(HOME_PATH)
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .map(|c| c.clone())
            .unwrap_or_else(|_| HOME_PATH.to_string())
    }

    fn navigate(&self, path: &str) {
        self.set_current(path);
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserNavigator;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{HOME_PATH, Navigator};
    use tracing::warn;

    /// Full-page navigation through `window.location`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BrowserNavigator;

    impl Navigator for BrowserNavigator {
        fn current_path(&self) -> String {
            web_sys::window()
                .and_then(|w| w.location().pathname().ok())
                .unwrap_or_else(|| HOME_PATH.to_string())
        }

        fn navigate(&self, path: &str) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if window.location().set_href(path).is_err() {
                warn!(path, "Browser navigation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_tracks_history() {
        let nav = RecordingNavigator::default();
        assert!(!nav.on_login_view());
        nav.navigate(LOGIN_PATH);
        assert!(nav.on_login_view());
        assert_eq!(nav.history(), vec![LOGIN_PATH.to_string()]);
    }

    #[test]
    fn test_login_view_prefix_match() {
        let nav = RecordingNavigator::starting_at("/login?next=/products");
        assert!(nav.on_login_view());
    }

    #[test]
    fn test_noop_navigator_stays_home() {
        let nav = NoopNavigator;
        nav.navigate(LOGIN_PATH);
        assert_eq!(nav.current_path(), HOME_PATH);
    }
}
