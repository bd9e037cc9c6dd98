//! Role baseline
//!
//! 内置角色的默认权限集，用于初始化角色表和“恢复默认”。
//! 基线是一个注入的不可变值 (服务器状态中 `Arc<RoleBaseline>`)，
//! 修改通过 [`RoleBaseline::with_role`] 生成新版本。

use shared::error::{AppError, AppResult, ErrorCode};

use super::permissions::{self, ROLE_ADMIN, ROLE_PENDING, ROLE_SUPER_ADMIN, ROLE_USER};

/// 单个角色的基线
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRole {
    pub name: String,
    pub description: String,
    pub level: i64,
    /// 目录顺序
    pub permissions: Vec<String>,
}

/// 版本化的角色基线
#[derive(Debug, Clone, PartialEq)]
pub struct RoleBaseline {
    version: u32,
    roles: Vec<BaselineRole>,
}

impl RoleBaseline {
    /// 内置基线 (version 1)
    pub fn builtin() -> Self {
        let admin_excluded = [
            permissions::MANAGE_EMPLOYEES,
            permissions::MANAGE_ARCHIVES,
            permissions::MANAGE_ROLES,
        ];
        let user_perms = [
            permissions::VIEW_SUPPLIES,
            permissions::REQUEST_SUPPLIES,
            permissions::VIEW_EMPLOYEES,
            permissions::VIEW_ARCHIVES,
            permissions::VIEW_KNOWLEDGE,
            permissions::VIEW_MESSAGES,
        ];

        let roles = vec![
            BaselineRole {
                name: ROLE_SUPER_ADMIN.into(),
                description: "系统超级管理员 - 拥有所有权限".into(),
                level: 1,
                permissions: permissions::all_permissions().map(String::from).collect(),
            },
            BaselineRole {
                name: ROLE_ADMIN.into(),
                description: "系统管理员 - 拥有大部分管理权限".into(),
                level: 2,
                permissions: permissions::all_permissions()
                    .filter(|p| !admin_excluded.contains(p))
                    .map(String::from)
                    .collect(),
            },
            BaselineRole {
                name: ROLE_USER.into(),
                description: "普通用户 - 基础使用权限".into(),
                level: 3,
                permissions: permissions::all_permissions()
                    .filter(|p| user_perms.contains(p))
                    .map(String::from)
                    .collect(),
            },
            BaselineRole {
                name: ROLE_PENDING.into(),
                description: "待审核用户 - 无任何权限".into(),
                level: 4,
                permissions: Vec::new(),
            },
        ];

        Self { version: 1, roles }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// 按 level 排序
    pub fn roles(&self) -> &[BaselineRole] {
        &self.roles
    }

    pub fn role(&self, name: &str) -> Option<&BaselineRole> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn permissions_for(&self, name: &str) -> Option<&[String]> {
        self.role(name).map(|r| r.permissions.as_slice())
    }

    /// 替换 (或新增) 一个角色的基线权限，返回版本 +1 的新基线
    ///
    /// 目录外的权限整体拒绝。新增角色排在最后一级之后。
    pub fn with_role(&self, name: &str, perms: &[&str]) -> AppResult<Self> {
        let unknown: Vec<&str> = perms
            .iter()
            .copied()
            .filter(|p| !permissions::is_known(p))
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::UnknownPermission,
                format!("未知权限: {}", unknown.join(", ")),
            )
            .with_detail("unknown", unknown));
        }

        let ordered: Vec<String> = permissions::all_permissions()
            .filter(|p| perms.contains(p))
            .map(String::from)
            .collect();

        let mut next = self.clone();
        next.version += 1;
        match next.roles.iter_mut().find(|r| r.name == name) {
            Some(role) => role.permissions = ordered,
            None => {
                let level = next.roles.iter().map(|r| r.level).max().unwrap_or(0) + 1;
                next.roles.push(BaselineRole {
                    name: name.to_string(),
                    description: name.to_string(),
                    level,
                    permissions: ordered,
                });
            }
        }
        Ok(next)
    }
}

impl Default for RoleBaseline {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_baseline() {
        let baseline = RoleBaseline::builtin();
        assert_eq!(baseline.version(), 1);
        assert_eq!(baseline.roles().len(), 4);

        assert_eq!(baseline.permissions_for(ROLE_SUPER_ADMIN).unwrap().len(), 18);
        assert!(baseline.permissions_for(ROLE_PENDING).unwrap().is_empty());

        let admin = baseline.permissions_for(ROLE_ADMIN).unwrap();
        assert_eq!(admin.len(), 15);
        assert!(!admin.iter().any(|p| p == permissions::MANAGE_ROLES));
        assert!(admin.iter().any(|p| p == permissions::APPROVE_REQUESTS));

        let user = baseline.permissions_for(ROLE_USER).unwrap();
        assert_eq!(
            user,
            &[
                "view_supplies",
                "request_supplies",
                "view_employees",
                "view_archives",
                "view_knowledge",
                "view_messages"
            ]
        );
    }

    #[test]
    fn test_with_role_bumps_version_without_touching_original() {
        let baseline = RoleBaseline::builtin();
        let next = baseline
            .with_role(ROLE_USER, &[permissions::VIEW_MESSAGES, permissions::VIEW_SUPPLIES])
            .unwrap();

        assert_eq!(next.version(), 2);
        assert_eq!(
            next.permissions_for(ROLE_USER).unwrap(),
            &["view_supplies", "view_messages"]
        );
        // 原基线不变
        assert_eq!(baseline.permissions_for(ROLE_USER).unwrap().len(), 6);
    }

    #[test]
    fn test_with_role_rejects_unknown_permission() {
        let err = RoleBaseline::builtin()
            .with_role(ROLE_USER, &["view_supplies", "launch_rockets"])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownPermission);
        assert!(err.message.contains("launch_rockets"));
    }

    #[test]
    fn test_with_new_role_appends_level() {
        let next = RoleBaseline::builtin()
            .with_role("auditor", &[permissions::VIEW_ARCHIVES])
            .unwrap();
        assert_eq!(next.role("auditor").unwrap().level, 5);
    }
}
