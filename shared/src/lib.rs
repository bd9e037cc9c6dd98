//! Shared types for the office portal
//!
//! Domain models, request DTOs, the unified error system and small
//! utilities used by the server and its clients.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
