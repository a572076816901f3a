//! Page-level operations on top of the client
//!
//! These carry the user-facing wording of each flow, so front ends only
//! display what they receive.

pub mod auth;
pub mod products;

pub use auth::{AuthApiService, LoginError, RegisterError};
pub use products::{ProductsError, ProductsService, ValidationError, validate_product};
