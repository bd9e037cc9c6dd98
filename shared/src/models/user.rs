//! User Model (portal accounts)

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult, ErrorCode};

/// Account status
///
/// `pending → active` (approve) or `pending → inactive` (reject).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserStatus {
    #[default]
    Pending,
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default department for accounts created without one
pub const DEFAULT_DEPARTMENT: &str = "通用";

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: String,
    pub status: UserStatus,
    pub is_active: bool,
    pub created_at: i64,
    pub last_login: Option<i64>,
}

impl User {
    /// `status == active ∧ is_active`
    pub fn is_approved(&self) -> bool {
        self.status == UserStatus::Active && self.is_active
    }

    /// Approve a pending registration
    pub fn approve(&mut self) -> AppResult<()> {
        self.ensure_pending()?;
        self.status = UserStatus::Active;
        self.is_active = true;
        Ok(())
    }

    /// Reject a pending registration
    pub fn reject(&mut self) -> AppResult<()> {
        self.ensure_pending()?;
        self.status = UserStatus::Inactive;
        self.is_active = false;
        Ok(())
    }

    fn ensure_pending(&self) -> AppResult<()> {
        if self.status != UserStatus::Pending {
            return Err(AppError::invalid_state(
                ErrorCode::UserNotPending,
                UserStatus::Pending.as_str(),
                self.status.as_str(),
            ));
        }
        Ok(())
    }

    /// Name shown in messages: real name when present
    pub fn display_name(&self) -> &str {
        self.real_name.as_deref().unwrap_or(&self.username)
    }
}

/// Self-service registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 80, message = "用户名长度3-80位"))]
    pub username: String,
    #[validate(length(min = 6, message = "密码长度至少6位"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "两次输入的密码不一致"))]
    pub confirm_password: String,
    #[validate(length(min = 1, message = "请输入真实姓名"))]
    pub real_name: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
}

/// Admin-created account payload (created active)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 3, max = 80, message = "用户名长度3-80位"))]
    pub username: String,
    #[validate(length(min = 6, message = "密码长度至少6位"))]
    pub password: String,
    pub real_name: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
}

/// Admin edit payload; `status` is an intentional override
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 80, message = "用户名长度3-80位"))]
    pub username: Option<String>,
    pub real_name: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub status: Option<UserStatus>,
}

/// Replace a user's role assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRolesUpdate {
    pub role_ids: Vec<i64>,
}

/// Admin password reset payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordReset {
    #[validate(length(min = 6, message = "密码长度至少6位"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "两次输入的密码不一致"))]
    pub confirm_password: String,
}

/// User listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    pub status: Option<UserStatus>,
}

/// User with role names, as returned by admin endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<String>,
    pub is_approved: bool,
}
