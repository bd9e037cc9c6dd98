//! Data models
//!
//! Shared between portal-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod dashboard;
pub mod employee;
pub mod knowledge;
pub mod message;
pub mod notification;
pub mod role;
pub mod supply;
pub mod supply_request;
pub mod user;

// Re-exports
pub use dashboard::*;
pub use employee::*;
pub use knowledge::*;
pub use message::*;
pub use notification::*;
pub use role::*;
pub use supply::*;
pub use supply_request::*;
pub use user::*;
