//! Client-related types shared between server and client
//!
//! Auth request/response types used in API communication.

use serde::{Deserialize, Serialize};

use crate::models::UserStatus;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information with effective permissions
///
/// `permissions` lists the catalog entries the user holds. For a super admin
/// this is the whole catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub real_name: Option<String>,
    pub department: String,
    pub status: UserStatus,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Registration accepted; the account awaits approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub status: UserStatus,
}
