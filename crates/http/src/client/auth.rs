//! Authentication endpoints

use super::{CatalogClient, error::ApiError};
use crate::types::{AuthResponse, Credentials};
use reqwest::Method;

impl CatalogClient {
    /// Exchange credentials for a bearer token
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.post("/api/auth/login", credentials).await
    }

    /// Create an account. The response body, if any, is ignored.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/api/auth/register")
            .json(credentials);
        self.execute_empty(request).await
    }
}
