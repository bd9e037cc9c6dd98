//! Role Store
//!
//! 角色权限集的解析、校验与持久化。数据库中的权限集是一个逗号分隔的
//! 字符串，按目录顺序存储。

use std::collections::HashSet;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Role;
use sqlx::SqlitePool;

use super::baseline::RoleBaseline;
use super::permissions::{self, BUILTIN_ROLES, SEPARATOR};
use crate::db::repository::role as role_repo;

/// 解析持久化的权限字符串，空片段忽略
pub fn parse_permissions(stored: &str) -> HashSet<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// 角色的权限集
pub fn permissions_of(role: &Role) -> HashSet<String> {
    parse_permissions(&role.permissions)
}

/// 校验并规范化待写入的权限列表
///
/// - 去掉分组标记和空白项
/// - 存在目录外标识时整体拒绝，错误中列出全部未知项
/// - 去重并按目录顺序排列
pub fn sanitize(requested: &[String]) -> AppResult<Vec<&'static str>> {
    let wanted: Vec<&str> = requested
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && *p != SEPARATOR)
        .collect();

    let mut unknown: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|p| !permissions::is_known(p))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        unknown.dedup();
        return Err(AppError::with_message(
            ErrorCode::UnknownPermission,
            format!("未知权限: {}", unknown.join(", ")),
        )
        .with_detail("unknown", unknown));
    }

    Ok(permissions::all_permissions()
        .filter(|p| wanted.contains(p))
        .collect())
}

/// 持久化形式
pub fn serialize<S: AsRef<str>>(perms: &[S]) -> String {
    perms
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

/// 只有内置角色可以通过角色接口编辑
pub fn ensure_editable(role_name: &str) -> AppResult<()> {
    if BUILTIN_ROLES.contains(&role_name) {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::RoleNotFound,
            format!("角色不存在: {role_name}"),
        ))
    }
}

/// 覆盖角色的权限集；拒绝时不做任何修改
pub async fn replace_permissions(
    pool: &SqlitePool,
    role_name: &str,
    requested: &[String],
) -> AppResult<Role> {
    ensure_editable(role_name)?;
    let perms = sanitize(requested)?;
    let role = role_repo::update_permissions(pool, role_name, &serialize(&perms))
        .await
        .map_err(|e| role_error(role_name, e))?;

    tracing::info!(role = %role_name, count = perms.len(), "Role permissions replaced");
    Ok(role)
}

/// 恢复为基线权限集
pub async fn reset_to_default(
    pool: &SqlitePool,
    baseline: &RoleBaseline,
    role_name: &str,
) -> AppResult<Role> {
    ensure_editable(role_name)?;
    let perms = baseline.permissions_for(role_name).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::RoleNotFound,
            format!("基线中没有角色: {role_name}"),
        )
    })?;

    let role = role_repo::update_permissions(pool, role_name, &serialize(perms))
        .await
        .map_err(|e| role_error(role_name, e))?;

    tracing::info!(
        role = %role_name,
        baseline_version = baseline.version(),
        "Role permissions reset to baseline"
    );
    Ok(role)
}

fn role_error(role_name: &str, err: crate::db::repository::RepoError) -> AppError {
    match err {
        crate::db::repository::RepoError::NotFound(_) => AppError::with_message(
            ErrorCode::RoleNotFound,
            format!("角色不存在: {role_name}"),
        ),
        other => other.into(),
    }
}
