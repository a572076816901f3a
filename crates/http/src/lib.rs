//! Catalog HTTP client
//!
//! [`client::CatalogClient`] is the single normalization boundary between the
//! remote API and the rest of the application: it attaches the stored bearer
//! token to outgoing requests and turns every failure into an
//! [`client::error::ApiError`]. The services and the auth session build on
//! top of it.

pub mod client;
pub mod services;
pub mod session;
pub mod types;

pub use client::error::{ApiError, ClientError};
pub use client::{CatalogClient, CatalogClientBuilder};
pub use services::{AuthApiService, ProductsService};
pub use session::{AuthSession, AuthUser, SessionError};
