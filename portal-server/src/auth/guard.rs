//! Action guard
//!
//! 每个处理器在读取或修改数据之前先调用守卫，得到一个显式的
//! [`Decision`]，再统一转换为响应错误。

use shared::error::{AppError, AppResult, ErrorCode};

use super::authorization;
use super::current_user::CurrentUser;
use crate::security_log;

/// 缺少的条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Permission(String),
    Role(String),
    /// 资源归属 (发布者、作者、收件人)
    Owner,
    /// 与申请人同部门
    Department,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// 没有登录用户
    Unauthenticated,
    /// 已登录但不满足条件
    Unauthorized { required: Requirement },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// `allowed` 为 false 时以 `required` 拒绝
    pub fn require(allowed: bool, required: Requirement) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::Unauthorized { required })
        }
    }

    /// 转换为处理器可直接 `?` 的结果
    ///
    /// | 拒绝原因 | 错误码 |
    /// |----------|--------|
    /// | Unauthenticated | 401 NotAuthenticated |
    /// | Permission | 403 PermissionDenied |
    /// | Role | 403 RoleRequired |
    /// | Owner | 403 NotOwner |
    /// | Department | 403 DepartmentMismatch |
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AppError::not_authenticated()),
            Decision::Deny(DenyReason::Unauthorized { required }) => Err(match required {
                Requirement::Permission(p) => {
                    AppError::permission_denied(format!("缺少权限: {p}"))
                        .with_detail("required_permission", p)
                }
                Requirement::Role(r) => {
                    AppError::with_message(ErrorCode::RoleRequired, format!("需要角色: {r}"))
                        .with_detail("required_role", r)
                }
                Requirement::Owner => AppError::new(ErrorCode::NotOwner),
                Requirement::Department => AppError::new(ErrorCode::DepartmentMismatch),
            }),
        }
    }
}

/// 认证 + 权限检查
pub fn check_permission(user: Option<&CurrentUser>, permission: &str) -> Decision {
    let Some(u) = user else {
        return unauthenticated();
    };
    if authorization::has_permission(user, permission) {
        return Decision::Allow;
    }
    security_log!(
        "WARN",
        "permission_denied",
        user_id = u.id,
        username = u.username.as_str(),
        required_permission = permission
    );
    Decision::require(false, Requirement::Permission(permission.to_string()))
}

/// 认证 + 全部权限检查，报告第一个缺少的权限
pub fn check_all(user: Option<&CurrentUser>, permissions: &[&str]) -> Decision {
    for p in permissions {
        let decision = check_permission(user, p);
        if !decision.is_allowed() {
            return decision;
        }
    }
    if user.is_none() {
        return unauthenticated();
    }
    Decision::Allow
}

/// 认证 + 角色检查
pub fn check_role(user: Option<&CurrentUser>, role: &str) -> Decision {
    let Some(u) = user else {
        return unauthenticated();
    };
    if authorization::has_role(user, role) {
        return Decision::Allow;
    }
    security_log!(
        "WARN",
        "role_required",
        user_id = u.id,
        username = u.username.as_str(),
        required_role = role
    );
    Decision::require(false, Requirement::Role(role.to_string()))
}

fn unauthenticated() -> Decision {
    security_log!("WARN", "unauthenticated_action", reason = "no current user");
    Decision::Deny(DenyReason::Unauthenticated)
}
