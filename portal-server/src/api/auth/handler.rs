//! Authentication Handlers

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, RegisterResponse, UserInfo};
use shared::error::{ApiResponse, AppResult};
use shared::models::RegisterRequest;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::accounts;

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = accounts::login(&state, &req).await?;
    Ok(Json(response))
}

/// POST /api/auth/register - 注册后等待管理员审核
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    req.validate()?;
    let response = accounts::register(state.pool(), &req).await?;
    Ok(Json(response))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<UserInfo>> {
    Ok(Json(accounts::me(state.pool(), &user).await?))
}

/// POST /api/auth/logout - 令牌无状态，客户端丢弃即可
pub async fn logout(user: CurrentUser) -> Json<ApiResponse<()>> {
    tracing::info!(user_id = user.id, username = %user.username, "User logged out");
    Json(ApiResponse::ok_with_message("已退出登录"))
}
