//! Authorization Engine
//!
//! 纯函数谓词，没有用户上下文一律拒绝，从不报错。
//!
//! 超级管理员绕过权限目录: [`is_super_admin`] 是唯一的绕过点，
//! 每次生效都记录到 `security` 日志目标。

use super::current_user::CurrentUser;
use super::permissions::ROLE_SUPER_ADMIN;

/// 是否持有超级管理员角色
pub fn is_super_admin(user: &CurrentUser) -> bool {
    has_role(Some(user), ROLE_SUPER_ADMIN)
}

/// 任一角色的权限集包含 `permission`；超级管理员恒为 true
pub fn has_permission(user: Option<&CurrentUser>, permission: &str) -> bool {
    let Some(user) = user else {
        return false;
    };

    let granted = user
        .roles
        .iter()
        .any(|r| r.permissions.contains(permission));
    if granted {
        return true;
    }

    if is_super_admin(user) {
        tracing::debug!(
            target: "security",
            user_id = user.id,
            permission,
            "super_admin bypass"
        );
        return true;
    }
    false
}

/// 任一角色名等于 `role`
pub fn has_role(user: Option<&CurrentUser>, role: &str) -> bool {
    user.is_some_and(|u| u.roles.iter().any(|r| r.name == role))
}

pub fn has_any(user: Option<&CurrentUser>, permissions: &[&str]) -> bool {
    permissions.iter().any(|p| has_permission(user, p))
}

pub fn has_all(user: Option<&CurrentUser>, permissions: &[&str]) -> bool {
    permissions.iter().all(|p| has_permission(user, p))
}
