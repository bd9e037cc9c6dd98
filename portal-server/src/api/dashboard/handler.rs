//! Dashboard Handler

use axum::{Json, extract::State};
use shared::error::AppResult;
use shared::models::DashboardView;

use crate::auth::CurrentUser;
use crate::auth::permissions::{APPROVE_REQUESTS, VIEW_SUPPLIES};
use crate::core::ServerState;
use crate::db::repository::{
    message as message_repo, supply as supply_repo, supply_request as request_repo,
};
use crate::scope::supply_request::RequestScope;
use crate::services::notifications;

const LATEST_NOTIFICATIONS: i64 = 5;
const RECENT_REQUESTS: i64 = 5;

/// GET /api/dashboard - 首页概览
pub async fn overview(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<DashboardView>> {
    let pool = state.pool();

    let pending_approvals = if user.has_permission(APPROVE_REQUESTS) {
        request_repo::count_pending(pool, &RequestScope::for_user(&user)).await?
    } else {
        0
    };
    let low_stock_count = if user.has_permission(VIEW_SUPPLIES) {
        supply_repo::count_low_stock(pool).await?
    } else {
        0
    };

    Ok(Json(DashboardView {
        notifications: notifications::list(pool, &user, Some(LATEST_NOTIFICATIONS)).await?,
        pending_approvals,
        unread_messages: message_repo::count_unread(pool, user.id).await?,
        low_stock_count,
        recent_requests: request_repo::list(
            pool,
            &RequestScope::Own(user.id),
            None,
            Some(RECENT_REQUESTS),
        )
        .await?,
    }))
}
