//! Permission Definitions
//!
//! 编译期固定的权限目录，按功能模块分组。
//!
//! ## 设计原则
//! - 权限是不透明的字符串标识，只通过角色引用，从不按用户存储
//! - 目录外的标识不会被持久化 (见 [`crate::auth::role_store`])
//! - `---separator---` 仅用于界面分组，永远不会写入数据库

use shared::models::{PermissionInfo, PermissionModule};

// === 用户管理 ===
pub const MANAGE_USERS: &str = "manage_users";
pub const APPROVE_USERS: &str = "approve_users";
pub const RESET_PASSWORDS: &str = "reset_passwords";
pub const MANAGE_ROLES: &str = "manage_roles";
// === 通知公告 ===
pub const PUBLISH_NOTICES: &str = "publish_notices";
// === 耗材管理 ===
pub const VIEW_SUPPLIES: &str = "view_supplies";
pub const REQUEST_SUPPLIES: &str = "request_supplies";
pub const APPROVE_REQUESTS: &str = "approve_requests";
pub const ISSUE_SUPPLIES: &str = "issue_supplies";
pub const MANAGE_SUPPLIES: &str = "manage_supplies";
// === 人员档案 ===
pub const VIEW_EMPLOYEES: &str = "view_employees";
pub const MANAGE_EMPLOYEES: &str = "manage_employees";
pub const VIEW_ARCHIVES: &str = "view_archives";
pub const MANAGE_ARCHIVES: &str = "manage_archives";
// === 知识库 ===
pub const VIEW_KNOWLEDGE: &str = "view_knowledge";
pub const MANAGE_KNOWLEDGE: &str = "manage_knowledge";
// === 消息系统 ===
pub const VIEW_MESSAGES: &str = "view_messages";
pub const SEND_MESSAGES: &str = "send_messages";

/// 界面分组标记，持久化前过滤
pub const SEPARATOR: &str = "---separator---";

/// 未归属任何模块的权限所在分组
pub const OTHER_MODULE: &str = "其他";

// === 内置角色 ===
pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_PENDING: &str = "pending";

/// 内置角色，按 level 排序
pub const BUILTIN_ROLES: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_USER, ROLE_PENDING];

/// 权限目录 (模块名, 权限列表)，顺序即展示与持久化顺序
const CATALOG: &[(&str, &[&str])] = &[
    (
        "用户管理",
        &[MANAGE_USERS, APPROVE_USERS, RESET_PASSWORDS, MANAGE_ROLES],
    ),
    ("通知公告", &[PUBLISH_NOTICES]),
    (
        "耗材管理",
        &[
            VIEW_SUPPLIES,
            REQUEST_SUPPLIES,
            APPROVE_REQUESTS,
            ISSUE_SUPPLIES,
            MANAGE_SUPPLIES,
        ],
    ),
    (
        "人员档案",
        &[VIEW_EMPLOYEES, MANAGE_EMPLOYEES, VIEW_ARCHIVES, MANAGE_ARCHIVES],
    ),
    ("知识库", &[VIEW_KNOWLEDGE, MANAGE_KNOWLEDGE]),
    ("消息系统", &[VIEW_MESSAGES, SEND_MESSAGES]),
];

/// 模块列表
pub fn modules() -> &'static [(&'static str, &'static [&'static str])] {
    CATALOG
}

/// 全部权限 (目录顺序)
pub fn all_permissions() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().flat_map(|(_, perms)| perms.iter().copied())
}

/// 是否目录内的权限
pub fn is_known(permission: &str) -> bool {
    all_permissions().any(|p| p == permission)
}

/// 目录中的位置，用于稳定排序
pub fn catalog_index(permission: &str) -> Option<usize> {
    all_permissions().position(|p| p == permission)
}

/// 权限描述，未描述的返回标识本身
pub fn description(permission: &str) -> &str {
    match permission {
        VIEW_SUPPLIES => "查看耗材库存",
        REQUEST_SUPPLIES => "申请耗材",
        APPROVE_REQUESTS => "审批耗材申请",
        ISSUE_SUPPLIES => "发放耗材",
        MANAGE_SUPPLIES => "管理耗材分类和库存",
        MANAGE_USERS => "管理用户账户",
        PUBLISH_NOTICES => "发布通知公告",
        VIEW_EMPLOYEES => "查看员工信息",
        MANAGE_EMPLOYEES => "管理员工档案",
        VIEW_ARCHIVES => "查看档案统计",
        MANAGE_ARCHIVES => "管理档案文件",
        VIEW_KNOWLEDGE => "查看知识库",
        MANAGE_KNOWLEDGE => "管理知识库内容",
        APPROVE_USERS => "审核用户注册",
        RESET_PASSWORDS => "重置用户密码",
        MANAGE_ROLES => "管理角色权限",
        VIEW_MESSAGES => "查看消息",
        SEND_MESSAGES => "发送消息",
        other => other,
    }
}

/// 所属模块，未归属的返回 [`OTHER_MODULE`]
pub fn module_of(permission: &str) -> &'static str {
    CATALOG
        .iter()
        .find(|(_, perms)| perms.contains(&permission))
        .map(|(name, _)| *name)
        .unwrap_or(OTHER_MODULE)
}

/// 角色简称，未知角色返回名称本身
pub fn role_display_name(role: &str) -> &str {
    match role {
        ROLE_SUPER_ADMIN => "超级管理员",
        ROLE_ADMIN => "管理员",
        ROLE_USER => "普通用户",
        ROLE_PENDING => "待审核用户",
        other => other,
    }
}

/// 权限及其目录信息
pub fn info(permission: &str) -> PermissionInfo {
    PermissionInfo {
        id: permission.to_string(),
        description: description(permission).to_string(),
        module: module_of(permission).to_string(),
    }
}

/// 整个目录，供管理界面展示
pub fn catalog_modules() -> Vec<PermissionModule> {
    CATALOG
        .iter()
        .map(|(name, perms)| PermissionModule {
            name: name.to_string(),
            permissions: perms.iter().map(|p| info(p)).collect(),
        })
        .collect()
}
