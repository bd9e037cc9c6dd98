//! Supply Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::AppResult;
use shared::models::{RequestDecision, RequestQuery, SupplyRequestCreate, SupplyRequestView};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::{APPROVE_REQUESTS, ISSUE_SUPPLIES, REQUEST_SUPPLIES};
use crate::core::ServerState;
use crate::services::supply_requests;

/// GET /api/requests?status=pending - 范围由角色决定 (本人 / 本部门 / 全部)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<SupplyRequestView>>> {
    Ok(Json(supply_requests::list(state.pool(), &user, query.status).await?))
}

/// POST /api/requests
pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SupplyRequestCreate>,
) -> AppResult<Json<SupplyRequestView>> {
    user.require(REQUEST_SUPPLIES)?;
    payload.validate()?;
    Ok(Json(supply_requests::submit(state.pool(), &user, &payload).await?))
}

/// POST /api/requests/{id}/decision
pub async fn decide(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RequestDecision>,
) -> AppResult<Json<SupplyRequestView>> {
    user.require(APPROVE_REQUESTS)?;
    Ok(Json(supply_requests::decide(state.pool(), &user, id, &payload).await?))
}

/// POST /api/requests/{id}/issue
pub async fn issue(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<SupplyRequestView>> {
    user.require(ISSUE_SUPPLIES)?;
    Ok(Json(supply_requests::issue(state.pool(), &user, id).await?))
}
