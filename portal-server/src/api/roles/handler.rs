//! Role & Permission API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{PermissionOverview, Role, RoleDetail, RolePermissionsUpdate};

use crate::auth::CurrentUser;
use crate::auth::permissions::{self, MANAGE_ROLES};
use crate::auth::role_store;
use crate::core::ServerState;
use crate::db::repository::role as role_repo;
use crate::security_log;

/// 权限按目录顺序展开，目录外的旧数据排在最后
fn role_detail(role: &Role) -> RoleDetail {
    let mut perms: Vec<String> = role_store::permissions_of(role).into_iter().collect();
    perms.sort_by(|a, b| {
        let ka = permissions::catalog_index(a).unwrap_or(usize::MAX);
        let kb = permissions::catalog_index(b).unwrap_or(usize::MAX);
        ka.cmp(&kb).then_with(|| a.cmp(b))
    });

    RoleDetail {
        id: role.id,
        name: role.name.clone(),
        display_name: permissions::role_display_name(&role.name).to_string(),
        description: role.description.clone(),
        level: role.level,
        permissions: perms.iter().map(|p| permissions::info(p)).collect(),
    }
}

/// GET /api/admin/permissions
pub async fn overview(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<PermissionOverview>> {
    user.require(MANAGE_ROLES)?;
    let roles = role_repo::find_all(state.pool()).await?;
    Ok(Json(PermissionOverview {
        roles: roles.iter().map(role_detail).collect(),
        modules: permissions::catalog_modules(),
        baseline_version: state.baseline().version(),
    }))
}

/// GET /api/admin/roles/{name}/permissions
pub async fn get_permissions(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<RoleDetail>> {
    user.require(MANAGE_ROLES)?;
    role_store::ensure_editable(&name)?;
    let role = role_repo::find_by_name(state.pool(), &name)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::RoleNotFound, format!("角色不存在: {name}")))?;
    Ok(Json(role_detail(&role)))
}

/// PUT /api/admin/roles/{name}/permissions - 整体覆盖，未知权限整体拒绝
pub async fn replace_permissions(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
    Json(payload): Json<RolePermissionsUpdate>,
) -> AppResult<Json<RoleDetail>> {
    user.require(MANAGE_ROLES)?;
    let role = role_store::replace_permissions(state.pool(), &name, &payload.permissions).await?;
    security_log!(
        "INFO",
        "role_permissions_changed",
        operator_id = user.id,
        role = name,
        permissions = role.permissions
    );
    Ok(Json(role_detail(&role)))
}

/// POST /api/admin/roles/{name}/reset - 恢复基线
pub async fn reset(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(name): Path<String>,
) -> AppResult<Json<RoleDetail>> {
    user.require(MANAGE_ROLES)?;
    let role = role_store::reset_to_default(state.pool(), state.baseline(), &name).await?;
    security_log!(
        "INFO",
        "role_permissions_reset",
        operator_id = user.id,
        role = name,
        baseline_version = state.baseline().version()
    );
    Ok(Json(role_detail(&role)))
}
