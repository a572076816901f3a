//! Catalog core types and utilities
//!
//! Everything here is transport-agnostic: configuration, the persisted
//! bearer token, client-side claims decoding and the navigation seam used
//! to send the user back to the login view.

pub mod claims;
pub mod config;
pub mod error;
pub mod navigation;
pub mod storage;
pub mod token;

pub use claims::{Claims, Role, RolePolicy};
pub use config::{AppConfig, AppEnv};
pub use error::{ConfigError, ConfigResult};
pub use navigation::{HOME_PATH, LOGIN_PATH, Navigator, NoopNavigator, RecordingNavigator};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use token::TokenStore;
