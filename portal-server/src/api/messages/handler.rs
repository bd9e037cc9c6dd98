//! Message API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use shared::error::{ApiResponse, AppResult};
use shared::models::{MessageList, MessageQuery, MessageSend, MessageView};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::{SEND_MESSAGES, VIEW_MESSAGES};
use crate::core::ServerState;
use crate::services::messages;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

/// GET /api/messages?filter=unread
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MessageQuery>,
) -> AppResult<Json<MessageList>> {
    Ok(Json(messages::list(state.pool(), &user, query.filter).await?))
}

/// GET /api/messages/unread-count
pub async fn unread_count(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    let unread_count = messages::unread_count(state.pool(), &user).await?;
    Ok(Json(UnreadCount { unread_count }))
}

/// GET /api/messages/{id} - 仅收件人，读取并标记已读
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageView>> {
    Ok(Json(messages::read(state.pool(), &user, id).await?))
}

/// POST /api/messages/{id}/read
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    messages::mark_read(state.pool(), &user, id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/messages
pub async fn send(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MessageSend>,
) -> AppResult<Json<MessageView>> {
    user.require(SEND_MESSAGES)?;
    payload.validate()?;
    Ok(Json(messages::send(state.pool(), &user, &payload).await?))
}

/// DELETE /api/messages/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require(VIEW_MESSAGES)?;
    messages::delete(state.pool(), &user, id).await?;
    Ok(Json(ApiResponse::ok_with_message("消息已删除")))
}
