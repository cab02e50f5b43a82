//! Shared types for the Storefront cart service
//!
//! Common types used by the service and its clients: the unified error
//! system (codes, categories, HTTP mapping, response envelope) and the
//! cart wire model.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{Cart, CartItem, CartView};
