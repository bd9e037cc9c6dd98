//! 当前用户上下文
//!
//! 由认证中间件每次请求从数据库加载 (角色与权限不进令牌)。

use std::collections::HashSet;

use shared::error::AppResult;
use shared::models::{Role, User};

use super::{authorization, guard, role_store};

/// 用户持有的一个角色及其权限集
#[derive(Debug, Clone, PartialEq)]
pub struct RoleGrant {
    pub name: String,
    pub permissions: HashSet<String>,
}

impl From<&Role> for RoleGrant {
    fn from(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
            permissions: role_store::permissions_of(role),
        }
    }
}

/// 当前用户上下文
///
/// # 示例
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> AppResult<Json<()>> {
///     user.require(permissions::APPROVE_REQUESTS)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub real_name: Option<String>,
    pub department: String,
    pub roles: Vec<RoleGrant>,
}

impl CurrentUser {
    pub fn new(
        id: i64,
        username: impl Into<String>,
        department: impl Into<String>,
        roles: &[Role],
    ) -> Self {
        Self {
            id,
            username: username.into(),
            real_name: None,
            department: department.into(),
            roles: roles.iter().map(RoleGrant::from).collect(),
        }
    }

    /// 由账户与其角色构建
    pub fn from_user(user: &User, roles: &[Role]) -> Self {
        Self {
            real_name: user.real_name.clone(),
            ..Self::new(user.id, user.username.clone(), user.department.clone(), roles)
        }
    }

    /// 显示名: 有真实姓名时用真实姓名
    pub fn display_name(&self) -> &str {
        self.real_name.as_deref().unwrap_or(&self.username)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        authorization::has_permission(Some(self), permission)
    }

    pub fn has_role(&self, role: &str) -> bool {
        authorization::has_role(Some(self), role)
    }

    pub fn has_any(&self, permissions: &[&str]) -> bool {
        authorization::has_any(Some(self), permissions)
    }

    pub fn has_all(&self, permissions: &[&str]) -> bool {
        authorization::has_all(Some(self), permissions)
    }

    pub fn is_super_admin(&self) -> bool {
        authorization::is_super_admin(self)
    }

    /// 要求权限，拒绝时返回 403
    pub fn require(&self, permission: &str) -> AppResult<()> {
        guard::check_permission(Some(self), permission).into_result()
    }

    /// 要求角色，拒绝时返回 403
    pub fn require_role(&self, role: &str) -> AppResult<()> {
        guard::check_role(Some(self), role).into_result()
    }

    /// 角色名列表
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    /// 实际生效的权限 (目录顺序)；超级管理员为整个目录
    pub fn effective_permissions(&self) -> Vec<String> {
        super::permissions::all_permissions()
            .filter(|p| {
                self.is_super_admin() || self.roles.iter().any(|r| r.permissions.contains(*p))
            })
            .map(String::from)
            .collect()
    }
}
