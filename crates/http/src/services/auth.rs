//! Authentication API service

use crate::client::CatalogClient;
use crate::client::error::ApiError;
use crate::session::{AuthSession, AuthUser, SessionError};
use crate::types::Credentials;
use thiserror::Error;
use tracing::info;

/// Login failure with the message to show next to the form
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct LoginError {
    pub message: String,
    #[source]
    pub source: Option<ApiError>,
}

/// Registration failure with the message to show next to the form
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RegisterError {
    pub message: String,
    #[source]
    pub source: Option<ApiError>,
}

impl LoginError {
    pub const INVALID_CREDENTIALS: &'static str =
        "Invalid credentials. Please check your email and password.";
    pub const FAILED: &'static str = "Login failed. Please try again.";
    pub const INVALID_TOKEN: &'static str = "Login failed: invalid token response";
    pub const NOT_SAVED: &'static str = "Login succeeded but the session could not be saved.";
}

impl From<SessionError> for LoginError {
    fn from(error: SessionError) -> Self {
        let message = match error {
            SessionError::InvalidToken => Self::INVALID_TOKEN,
            SessionError::Storage(_) => Self::NOT_SAVED,
        };
        Self {
            message: message.to_string(),
            source: None,
        }
    }
}

impl RegisterError {
    pub const FAILED: &'static str = "Registration failed. Please try again.";
}

impl From<ApiError> for LoginError {
    fn from(error: ApiError) -> Self {
        Self {
            message: login_error_message(&error),
            source: Some(error),
        }
    }
}

impl From<ApiError> for RegisterError {
    fn from(error: ApiError) -> Self {
        Self {
            message: register_error_message(&error),
            source: Some(error),
        }
    }
}

/// Message for a failed login attempt
pub fn login_error_message(error: &ApiError) -> String {
    match error.status {
        None => ApiError::NETWORK_MESSAGE.to_string(),
        Some(401) => LoginError::INVALID_CREDENTIALS.to_string(),
        Some(_) => error
            .server_message()
            .unwrap_or(LoginError::FAILED)
            .to_string(),
    }
}

/// Message for a failed registration
///
/// A non-empty `errors` list is joined with single spaces; otherwise the
/// server's `message` is used.
pub fn register_error_message(error: &ApiError) -> String {
    if error.is_network() {
        return ApiError::NETWORK_MESSAGE.to_string();
    }
    let errors = error.server_errors();
    if !errors.is_empty() {
        return errors.join(" ");
    }
    error
        .server_message()
        .unwrap_or(RegisterError::FAILED)
        .to_string()
}

/// Login and registration flows
#[derive(Clone)]
pub struct AuthApiService {
    client: CatalogClient,
    session: AuthSession,
}

impl AuthApiService {
    pub fn new(client: CatalogClient, session: AuthSession) -> Self {
        Self { client, session }
    }

    /// Sign in, store the token and go to the landing view
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthUser, LoginError> {
        let response = self.client.login(credentials).await?;

        let token = response
            .bearer_token()
            .ok_or_else(|| LoginError::from(SessionError::InvalidToken))?;
        let user = self.session.login(token)?;

        info!(email = %user.email, "Login succeeded");
        self.session.navigate_home();
        Ok(user)
    }

    /// Create an account and go to the login view
    pub async fn register(&self, credentials: &Credentials) -> Result<(), RegisterError> {
        self.client.register(credentials).await?;
        info!(email = %credentials.email, "Registration succeeded");
        self.session.register_success_redirect();
        Ok(())
    }

    /// Sign out
    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }
}
