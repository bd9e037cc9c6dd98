//! Role Model

use serde::{Deserialize, Serialize};

/// Role entity (RBAC 角色)
///
/// `permissions` is the persisted comma-delimited permission string.
/// Parse it through the server's role store, never by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Comma-delimited permission identifiers, e.g. `view_supplies,request_supplies`
    pub permissions: String,
    /// Lower level = higher authority (display ordering only)
    pub level: i64,
}

/// Replace a role's permission set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermissionsUpdate {
    pub permissions: Vec<String>,
}

/// A permission with its catalog metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PermissionInfo {
    pub id: String,
    pub description: String,
    pub module: String,
}

/// A catalog module with its permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionModule {
    pub name: String,
    pub permissions: Vec<PermissionInfo>,
}

/// Role with its decoded permission set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDetail {
    pub id: i64,
    pub name: String,
    /// Short display name (超级管理员, 管理员 ...)
    pub display_name: String,
    pub description: Option<String>,
    pub level: i64,
    pub permissions: Vec<PermissionInfo>,
}

/// Admin permission overview: roles ordered by level plus the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionOverview {
    pub roles: Vec<RoleDetail>,
    pub modules: Vec<PermissionModule>,
    /// Version of the role baseline used by reset
    pub baseline_version: u32,
}
