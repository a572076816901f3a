//! Navigator for a terminal session
//!
//! A CLI has no views to switch between; each command starts "on" the view
//! it stands in for and navigations are recorded so the command can tell the
//! user what to do next.

use catalog_core::Navigator;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug)]
pub struct TerminalNavigator {
    current: Mutex<String>,
}

impl TerminalNavigator {
    pub fn starting_at(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        info!(path, "Navigating");
        if let Ok(mut current) = self.current.lock() {
            *current = path.to_string();
        }
    }
}
