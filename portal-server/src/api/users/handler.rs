//! User Administration API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::{ApiResponse, AppResult};
use shared::models::{
    PasswordReset, User, UserCreate, UserQuery, UserRolesUpdate, UserUpdate, UserWithRoles,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::{APPROVE_USERS, MANAGE_ROLES, MANAGE_USERS, RESET_PASSWORDS};
use crate::core::ServerState;
use crate::security_log;
use crate::services::accounts;

/// GET /api/admin/users?status=pending
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserWithRoles>>> {
    user.require(MANAGE_USERS)?;
    Ok(Json(accounts::list_users(state.pool(), query.status).await?))
}

/// POST /api/admin/users - 管理员创建的账号直接生效
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<User>> {
    user.require(MANAGE_USERS)?;
    payload.validate()?;
    let created = accounts::create_user(state.pool(), &payload).await?;
    security_log!("INFO", "user_created", operator_id = user.id, user_id = created.id);
    Ok(Json(created))
}

/// PUT /api/admin/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    user.require(MANAGE_USERS)?;
    payload.validate()?;
    Ok(Json(accounts::update_user(state.pool(), id, &payload).await?))
}

/// POST /api/admin/users/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    user.require(APPROVE_USERS)?;
    Ok(Json(accounts::approve(state.pool(), &user, id).await?))
}

/// POST /api/admin/users/{id}/reject
pub async fn reject(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    user.require(APPROVE_USERS)?;
    Ok(Json(accounts::reject(state.pool(), &user, id).await?))
}

/// PUT /api/admin/users/{id}/roles - 整体替换
pub async fn set_roles(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserRolesUpdate>,
) -> AppResult<Json<UserWithRoles>> {
    user.require(MANAGE_ROLES)?;
    let updated = accounts::set_roles(state.pool(), id, &payload.role_ids).await?;
    security_log!(
        "INFO",
        "user_roles_changed",
        operator_id = user.id,
        user_id = id,
        roles = updated.roles.join(",")
    );
    Ok(Json(updated))
}

/// POST /api/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PasswordReset>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require(RESET_PASSWORDS)?;
    payload.validate()?;
    accounts::reset_password(state.pool(), id, &payload).await?;
    Ok(Json(ApiResponse::ok_with_message("密码已重置")))
}
