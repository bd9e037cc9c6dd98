//! Supply API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppResult};
use shared::models::{
    Supply, SupplyCatalog, SupplyCategory, SupplyCategoryInput, SupplyInbound, SupplyInput,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::guard;
use crate::auth::permissions::{MANAGE_SUPPLIES, ROLE_ADMIN, VIEW_SUPPLIES};
use crate::core::ServerState;
use crate::db::repository::supply as supply_repo;

/// GET /api/supplies - 可申领的耗材和分类
pub async fn catalog(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<SupplyCatalog>> {
    user.require(VIEW_SUPPLIES)?;
    let pool = state.pool();
    Ok(Json(SupplyCatalog {
        supplies: supply_repo::find_available(pool).await?,
        categories: supply_repo::find_categories(pool).await?,
    }))
}

/// GET /api/admin/supplies - 全部耗材 (含停用)
pub async fn list_all(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Supply>>> {
    user.require(MANAGE_SUPPLIES)?;
    Ok(Json(supply_repo::find_all(state.pool()).await?))
}

/// POST /api/admin/supplies
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SupplyInput>,
) -> AppResult<Json<Supply>> {
    user.require(MANAGE_SUPPLIES)?;
    payload.validate()?;
    let supply = supply_repo::create(state.pool(), &payload).await?;
    tracing::info!(supply_id = supply.id, name = %supply.name, "Supply created");
    Ok(Json(supply))
}

/// PUT /api/admin/supplies/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<SupplyInput>,
) -> AppResult<Json<Supply>> {
    user.require(MANAGE_SUPPLIES)?;
    payload.validate()?;
    Ok(Json(supply_repo::update(state.pool(), id, &payload).await?))
}

/// POST /api/admin/supplies/{id}/disable - 仅管理员角色
pub async fn disable(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Supply>> {
    set_available(&state, &user, id, false).await
}

/// POST /api/admin/supplies/{id}/enable - 仅管理员角色
pub async fn enable(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Supply>> {
    set_available(&state, &user, id, true).await
}

async fn set_available(
    state: &ServerState,
    user: &CurrentUser,
    id: i64,
    available: bool,
) -> AppResult<Json<Supply>> {
    guard::check_role(Some(user), ROLE_ADMIN).into_result()?;
    let supply = supply_repo::set_available(state.pool(), id, available).await?;
    tracing::info!(supply_id = id, available, operator_id = user.id, "Supply availability changed");
    Ok(Json(supply))
}

/// POST /api/supplies/inbound - 入库
pub async fn inbound(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SupplyInbound>,
) -> AppResult<Json<Supply>> {
    user.require(MANAGE_SUPPLIES)?;
    payload.validate()?;
    let supply = supply_repo::add_stock(state.pool(), payload.supply_id, payload.quantity).await?;
    tracing::info!(
        supply_id = supply.id,
        quantity = payload.quantity,
        current_stock = supply.current_stock,
        "Supply stock added"
    );
    Ok(Json(supply))
}

// ── Categories ──────────────────────────────────────────────

/// GET /api/supply-categories
pub async fn list_categories(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<SupplyCategory>>> {
    user.require(MANAGE_SUPPLIES)?;
    Ok(Json(supply_repo::find_categories(state.pool()).await?))
}

/// POST /api/supply-categories
pub async fn create_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SupplyCategoryInput>,
) -> AppResult<Json<SupplyCategory>> {
    user.require(MANAGE_SUPPLIES)?;
    payload.validate()?;
    Ok(Json(supply_repo::create_category(state.pool(), &payload).await?))
}

/// PUT /api/supply-categories/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<SupplyCategoryInput>,
) -> AppResult<Json<SupplyCategory>> {
    user.require(MANAGE_SUPPLIES)?;
    payload.validate()?;
    Ok(Json(supply_repo::update_category(state.pool(), id, &payload).await?))
}

/// DELETE /api/supply-categories/{id} - 仍有耗材引用时拒绝
pub async fn delete_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require(MANAGE_SUPPLIES)?;
    supply_repo::delete_category(state.pool(), id).await?;
    Ok(Json(ApiResponse::ok_with_message("分类已删除")))
}
