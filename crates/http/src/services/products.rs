//! Product catalog service

use crate::client::CatalogClient;
use crate::client::error::ApiError;
use crate::session::AuthSession;
use crate::types::{Product, ProductUpsert};
use thiserror::Error;
use tracing::debug;

/// Client-side rejection of a product form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required.")]
    NameRequired,

    #[error("Price must be greater than 0.")]
    PriceNotPositive,

    #[error("Stock must be a non-negative integer.")]
    NegativeStock,
}

/// Failure of a product operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ProductsError {
    /// Message to show inline
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Check a product form before it is sent
pub fn validate_product(product: &ProductUpsert) -> Result<(), ValidationError> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !product.price.is_finite() || product.price <= 0.0 {
        return Err(ValidationError::PriceNotPositive);
    }
    if product.stock < 0 {
        return Err(ValidationError::NegativeStock);
    }
    Ok(())
}

/// Product list and admin actions
#[derive(Clone)]
pub struct ProductsService {
    client: CatalogClient,
    session: AuthSession,
}

impl ProductsService {
    pub fn new(client: CatalogClient, session: AuthSession) -> Self {
        Self { client, session }
    }

    /// Whether create/update/delete should be offered to the current user
    ///
    /// The server enforces this independently.
    pub fn can_manage(&self) -> bool {
        self.session.role().is_some_and(|role| role.is_admin())
    }

    pub async fn list(&self) -> Result<Vec<Product>, ProductsError> {
        Ok(self.client.list_products().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Product, ProductsError> {
        Ok(self.client.get_product(id).await?)
    }

    pub async fn create(&self, product: &ProductUpsert) -> Result<Product, ProductsError> {
        validate_product(product)?;
        debug!(name = %product.name, "Creating product");
        Ok(self.client.create_product(&Self::cleaned(product)).await?)
    }

    pub async fn update(&self, id: &str, product: &ProductUpsert) -> Result<Product, ProductsError> {
        validate_product(product)?;
        debug!(id, "Updating product");
        Ok(self.client.update_product(id, &Self::cleaned(product)).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ProductsError> {
        debug!(id, "Deleting product");
        Ok(self.client.delete_product(id).await?)
    }

    /// Trimmed name, blank description dropped
    fn cleaned(product: &ProductUpsert) -> ProductUpsert {
        ProductUpsert {
            name: product.name.trim().to_string(),
            description: product
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            price: product.price,
            stock: product.stock,
        }
    }
}
