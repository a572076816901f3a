//! Client error types

use crate::types::{FieldViolation, ServerErrorBody};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Failure to construct a client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Normalized failure of a request
///
/// Produced for every non-2xx response and every transport failure so that
/// callers never have to inspect raw transport errors.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, absent when no response was received
    pub status: Option<u16>,
    /// Human-readable message
    pub message: String,
    /// Response body, when there was one
    pub details: Option<Value>,
}

impl ApiError {
    pub const NETWORK_MESSAGE: &'static str = "Network error. Please try again.";
    pub const GENERIC_MESSAGE: &'static str = "Something went wrong. Please try again.";
    pub const INVALID_RESPONSE_MESSAGE: &'static str = "Invalid response from server.";

    /// No response was received (connection refused, DNS, timeout)
    pub fn network() -> Self {
        Self {
            status: None,
            message: Self::NETWORK_MESSAGE.to_string(),
            details: None,
        }
    }

    /// The request could not be sent at all
    pub fn unexpected() -> Self {
        Self {
            status: None,
            message: Self::GENERIC_MESSAGE.to_string(),
            details: None,
        }
    }

    /// A 2xx response whose body did not match the expected shape
    pub fn invalid_response(status: u16) -> Self {
        Self {
            status: Some(status),
            message: Self::INVALID_RESPONSE_MESSAGE.to_string(),
            details: None,
        }
    }

    /// Build from an error response
    ///
    /// The message is the server's `message` field when it is a non-blank
    /// string, otherwise a generic text naming the status.
    pub fn from_response(status: u16, details: Option<Value>) -> Self {
        let message = server_message(details.as_ref())
            .map_or_else(|| format!("Request failed with status {status}"), str::to_string);
        Self {
            status: Some(status),
            message,
            details,
        }
    }

    /// Turn raw response bytes into `details`
    ///
    /// JSON bodies are kept as parsed; any other non-blank body is kept as a
    /// string.
    pub fn details_from_body(body: &[u8]) -> Option<Value> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        serde_json::from_slice(body).ok().or_else(|| {
            Some(Value::String(String::from_utf8_lossy(body).into_owned()))
        })
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// No response was received
    pub fn is_network(&self) -> bool {
        self.status.is_none()
    }

    /// The server's `message` field, if it is a non-blank string
    pub fn server_message(&self) -> Option<&str> {
        server_message(self.details.as_ref())
    }

    /// The server's `errors` list rendered as strings
    ///
    /// String entries are taken verbatim; object entries contribute their
    /// `message` field.
    pub fn server_errors(&self) -> Vec<String> {
        self.details
            .as_ref()
            .and_then(|d| d.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| match e {
                        Value::String(s) => Some(s.clone()),
                        other => other.get("message").and_then(Value::as_str).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The body parsed as the server's structured error shape
    pub fn body(&self) -> Option<ServerErrorBody> {
        self.details
            .as_ref()
            .filter(|d| d.is_object())
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Per-field validation failures reported by the server
    pub fn field_errors(&self) -> Vec<FieldViolation> {
        self.body().map(|b| b.field_errors).unwrap_or_default()
    }
}

fn server_message(details: Option<&Value>) -> Option<&str> {
    details?
        .get("message")?
        .as_str()
        .filter(|m| !m.trim().is_empty())
}
