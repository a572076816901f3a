//! Product catalog endpoints

use super::{CatalogClient, error::ApiError};
use crate::types::{Product, ProductUpsert};

impl CatalogClient {
    /// List all products
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/products").await
    }

    /// Fetch one product
    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        self.get(&format!("/products/{id}")).await
    }

    /// Create a product (admin only on the server side)
    pub async fn create_product(&self, product: &ProductUpsert) -> Result<Product, ApiError> {
        self.post("/products", product).await
    }

    /// Replace a product's fields
    pub async fn update_product(
        &self,
        id: &str,
        product: &ProductUpsert,
    ) -> Result<Product, ApiError> {
        self.put(&format!("/products/{id}"), product).await
    }

    /// Delete a product
    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/products/{id}")).await
    }
}
