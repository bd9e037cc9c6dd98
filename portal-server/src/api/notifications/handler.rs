//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppResult};
use shared::models::{NotificationInput, NotificationView};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::PUBLISH_NOTICES;
use crate::core::ServerState;
use crate::services::notifications;

/// GET /api/notifications - 当前用户可见的通知
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<NotificationView>>> {
    Ok(Json(notifications::list(state.pool(), &user, None).await?))
}

/// GET /api/notifications/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<NotificationView>> {
    Ok(Json(notifications::detail(state.pool(), &user, id).await?))
}

/// POST /api/notifications - 发布通知
pub async fn publish(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<NotificationInput>,
) -> AppResult<Json<NotificationView>> {
    user.require(PUBLISH_NOTICES)?;
    payload.validate()?;
    Ok(Json(notifications::publish(state.pool(), &user, &payload).await?))
}

/// PUT /api/notifications/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<NotificationInput>,
) -> AppResult<Json<NotificationView>> {
    payload.validate()?;
    Ok(Json(notifications::update(state.pool(), &user, id, &payload).await?))
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    notifications::delete(state.pool(), &user, id).await?;
    Ok(Json(ApiResponse::ok_with_message("通知已删除")))
}
