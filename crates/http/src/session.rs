//! Application-level authentication state
//!
//! Everything here is derived from the token store on demand, so a token
//! cleared by the client's 401 handling is immediately reflected.

use catalog_core::claims::{self, Role, RolePolicy};
use catalog_core::{HOME_PATH, LOGIN_PATH, Navigator, StorageError, TokenStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Why a token could not become the active session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token could not be decoded")]
    InvalidToken,

    #[error("token could not be saved: {0}")]
    Storage(#[from] StorageError),
}

/// The signed-in user as described by the token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    /// `sub` claim, then `email`, else empty
    pub email: String,
    /// Role resolved through the configured policy
    pub role: Option<Role>,
    /// `exp` claim
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }

    /// Whether the token's `exp` lies at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Login/logout transitions and derived user state
#[derive(Clone)]
pub struct AuthSession {
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    policy: RolePolicy,
}

impl AuthSession {
    pub fn new(tokens: TokenStore, navigator: Arc<dyn Navigator>, policy: RolePolicy) -> Self {
        Self {
            tokens,
            navigator,
            policy,
        }
    }

    /// Startup check: a stored token that does not decode is discarded
    pub fn restore(&self) -> Option<AuthUser> {
        let token = self.tokens.get()?;
        let user = self.user_from(&token);
        if user.is_none() {
            warn!("Discarding malformed stored token");
            self.tokens.clear();
        }
        user
    }

    /// Store `token` and return the user it describes
    ///
    /// A token that does not decode is not kept and any previous token is
    /// dropped. A storage failure is reported rather than swallowed.
    pub fn login(&self, token: &str) -> Result<AuthUser, SessionError> {
        let Some(user) = self.user_from(token.trim()) else {
            warn!("Login token could not be decoded, staying anonymous");
            self.tokens.clear();
            return Err(SessionError::InvalidToken);
        };
        self.tokens.try_set(token).map_err(|e| {
            warn!(error = %e, "Failed to save login token");
            e
        })?;
        info!("Signed in");
        Ok(user)
    }

    /// Forget the token and go to the login view
    pub fn logout(&self) {
        self.tokens.clear();
        info!("Signed out");
        self.navigator.navigate(LOGIN_PATH);
    }

    /// After a successful registration the user signs in explicitly
    pub fn register_success_redirect(&self) {
        self.navigator.navigate(LOGIN_PATH);
    }

    /// Landing view after a successful login
    pub fn navigate_home(&self) {
        self.navigator.navigate(HOME_PATH);
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.user_from(&self.token()?)
    }

    pub fn role(&self) -> Option<Role> {
        claims::role_of(self.token().as_deref(), self.policy)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Route guard: authenticated, and holding one of `allowed` when it is non-empty
    pub fn has_role(&self, allowed: &[&str]) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        if allowed.is_empty() {
            return true;
        }
        self.role()
            .is_some_and(|role| allowed.contains(&role.as_str()))
    }

    fn user_from(&self, token: &str) -> Option<AuthUser> {
        let claims = claims::decode(token)?;
        Some(AuthUser {
            email: claims.email().unwrap_or_default().to_string(),
            role: claims.role(self.policy),
            expires_at: claims.expires_at(),
        })
    }
}
