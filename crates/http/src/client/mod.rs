//! Catalog HTTP client
//!
//! Requests pass through two stages: outbound, the stored bearer token is
//! attached unless the caller already set `Authorization`; inbound, failures
//! are normalized into [`ApiError`] and a 401 clears the token and sends the
//! user to the login view once.

pub mod auth;
pub mod error;
pub mod products;

use catalog_core::{AppConfig, LOGIN_PATH, Navigator, NoopNavigator, TokenStore};
use error::{ApiError, ClientError};
use reqwest::{Client, ClientBuilder, Method, Response, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("catalog-client/", env!("CARGO_PKG_VERSION"));

/// Catalog API client
///
/// Cheap to clone; clones share the connection pool, the token store and
/// the redirect latch.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    /// Set by the first 401 that triggers a redirect; never reset
    redirecting: AtomicBool,
}

impl CatalogClient {
    /// Create a new client builder
    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::default()
    }

    /// Build a client from the startup configuration
    pub fn from_config(
        config: &AppConfig,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(&config.api_base_url)
            .timeout(config.request_timeout())
            .token_store(tokens)
            .navigator(navigator)
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Token store consulted on every request
    pub fn token_store(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Whether a 401 has already redirected to the login view
    pub fn is_redirecting(&self) -> bool {
        self.inner.redirecting.load(Ordering::SeqCst)
    }

    /// Create a request builder for `path` relative to the base URL
    ///
    /// Headers set on the returned builder take precedence over the
    /// automatic bearer token.
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, path);
        self.inner
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
    }

    /// Send a request and deserialize its JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            warn!(status, error = %e, "Failed to read response body");
            ApiError::invalid_response(status)
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!(status, error = %e, "Unexpected response body");
            ApiError::invalid_response(status)
        })
    }

    /// Send a request and discard its body
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, path))
            .await
    }

    /// Run both interception stages around the actual exchange
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        let mut request = request.build().map_err(|e| {
            warn!(error = %e, "Failed to build request");
            ApiError::unexpected()
        })?;
        self.attach_token(&mut request);

        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "Sending request");

        match self.inner.client.execute(request).await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => Err(self.reject(response).await),
            Err(e) => {
                warn!(%method, %path, timeout = e.is_timeout(), error = %e, "Request failed without a response");
                Err(ApiError::network())
            }
        }
    }

    /// Outbound stage
    fn attach_token(&self, request: &mut reqwest::Request) {
        if request.headers().contains_key(header::AUTHORIZATION) {
            return;
        }
        let Some(token) = self.inner.tokens.get() else {
            return;
        };
        match header::HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored auth token is not a valid header value, sending anonymously"),
        }
    }

    /// Inbound stage for non-2xx responses
    async fn reject(&self, response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.bytes().await.unwrap_or_default();
        let error = ApiError::from_response(status, ApiError::details_from_body(&body));
        debug!(status, message = %error.message, "Request rejected");

        if error.is_unauthorized() {
            self.handle_unauthorized();
        }
        error
    }

    fn handle_unauthorized(&self) {
        self.inner.tokens.clear();

        let navigator = &self.inner.navigator;
        if navigator.on_login_view() {
            return;
        }
        if self
            .inner
            .redirecting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Session expired, redirecting to login");
            navigator.navigate(LOGIN_PATH);
        }
    }
}

/// Builder for CatalogClient
#[derive(Default)]
pub struct CatalogClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    tokens: Option<TokenStore>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl CatalogClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (defaults to 10 seconds)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Token store to read bearer tokens from (defaults to an in-memory store)
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Navigator used for the login redirect (defaults to one that never moves)
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CatalogClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = catalog_core::config::normalize_base_url(&base_url);

        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let mut client_builder = ClientBuilder::new().user_agent(USER_AGENT);

        #[cfg(not(target_arch = "wasm32"))]
        {
            client_builder = client_builder.timeout(timeout);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout; // Timeouts not supported on WASM

        let client = client_builder.build()?;

        Ok(CatalogClient {
            inner: Arc::new(Inner {
                client,
                base_url,
                tokens: self.tokens.unwrap_or_else(TokenStore::in_memory),
                navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
                redirecting: AtomicBool::new(false),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = CatalogClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_builder_rejects_relative_url() {
        let result = CatalogClient::builder().base_url("/api").build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_builder_normalizes_base_url() {
        let client = CatalogClient::builder()
            .base_url(" http://localhost:8080/ ")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert!(!client.is_redirecting());
    }

    #[test]
    fn test_from_config_shares_token_store() {
        let tokens = TokenStore::in_memory();
        let client = CatalogClient::from_config(
            &AppConfig::new("http://localhost:8080"),
            tokens.clone(),
            Arc::new(NoopNavigator),
        )
        .unwrap();
        tokens.set("a.b.c");
        assert_eq!(client.token_store().get().as_deref(), Some("a.b.c"));
    }
}
