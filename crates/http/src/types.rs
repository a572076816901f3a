//! Request and response bodies of the catalog API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Email/password pair sent to the login and register endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Successful login response
///
/// Older servers return the token as `token` rather than `accessToken`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in_seconds: Option<u64>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthResponse {
    /// The bearer token, if the server sent a non-blank one
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.trim().is_empty()))
    }
}

/// Product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of product create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpsert {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
}

/// Structured error body the server sends with 4xx/5xx responses
///
/// Every field is optional; bodies from proxies or older endpoints carry
/// only some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub field_errors: Vec<FieldViolation>,
}

/// A single rejected request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_response_prefers_access_token() {
        let body: AuthResponse = serde_json::from_value(json!({
            "accessToken": "a.b.c",
            "token": "x.y.z",
            "tokenType": "Bearer",
            "expiresInSeconds": 3600,
            "role": "USER"
        }))
        .unwrap();
        assert_eq!(body.bearer_token(), Some("a.b.c"));
        assert_eq!(body.expires_in_seconds, Some(3600));
    }

    #[test]
    fn test_auth_response_falls_back_to_token() {
        let body: AuthResponse =
            serde_json::from_value(json!({"accessToken": "", "token": "x.y.z"})).unwrap();
        assert_eq!(body.bearer_token(), Some("x.y.z"));

        let empty: AuthResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.bearer_token(), None);
    }

    #[test]
    fn test_product_accepts_both_timestamp_spellings() {
        let camel: Product = serde_json::from_value(json!({
            "id": "1", "name": "Lamp", "price": 9.5, "stock": 3,
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let snake: Product = serde_json::from_value(json!({
            "id": "1", "name": "Lamp", "price": 9.5, "stock": 3,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(camel, snake);
        assert!(camel.created_at.is_some());
        assert_eq!(camel.description, None);
    }

    #[test]
    fn test_upsert_omits_missing_description() {
        let body = serde_json::to_value(ProductUpsert {
            name: "Lamp".into(),
            description: None,
            price: 1.0,
            stock: 0,
        })
        .unwrap();
        assert!(body.get("description").is_none());
    }

    #[test]
    fn test_server_error_body_reads_field_errors() {
        let body: ServerErrorBody = serde_json::from_value(json!({
            "status": 400,
            "error": "Bad Request",
            "message": "Validation failed",
            "traceId": "abc",
            "fieldErrors": [{"field": "price", "message": "must be greater than 0"}]
        }))
        .unwrap();
        assert_eq!(body.trace_id.as_deref(), Some("abc"));
        assert_eq!(body.field_errors[0].field, "price");
    }
}
