//! Knowledge Base API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppResult};
use shared::models::{
    KnowledgeArticle, KnowledgeArticleInput, KnowledgeCategory, KnowledgeCategoryInput,
    KnowledgeCategoryPage, KnowledgeHome,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::permissions::{MANAGE_KNOWLEDGE, VIEW_KNOWLEDGE};
use crate::core::ServerState;
use crate::services::knowledge;

/// GET /api/knowledge - 顶级分类 + 最新文章
pub async fn home(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<KnowledgeHome>> {
    user.require(VIEW_KNOWLEDGE)?;
    Ok(Json(knowledge::home(state.pool()).await?))
}

/// GET /api/knowledge/categories/{id}
pub async fn category_page(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<KnowledgeCategoryPage>> {
    user.require(VIEW_KNOWLEDGE)?;
    Ok(Json(knowledge::category_page(state.pool(), id).await?))
}

/// POST /api/knowledge/categories
pub async fn create_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<KnowledgeCategoryInput>,
) -> AppResult<Json<KnowledgeCategory>> {
    user.require(MANAGE_KNOWLEDGE)?;
    payload.validate()?;
    Ok(Json(knowledge::create_category(state.pool(), &payload).await?))
}

/// PUT /api/knowledge/categories/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<KnowledgeCategoryInput>,
) -> AppResult<Json<KnowledgeCategory>> {
    user.require(MANAGE_KNOWLEDGE)?;
    payload.validate()?;
    Ok(Json(knowledge::update_category(state.pool(), id, &payload).await?))
}

/// DELETE /api/knowledge/categories/{id}
pub async fn delete_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require(MANAGE_KNOWLEDGE)?;
    knowledge::delete_category(state.pool(), id).await?;
    Ok(Json(ApiResponse::ok_with_message("分类已删除")))
}

/// GET /api/knowledge/articles/{id} - 浏览次数 +1
pub async fn get_article(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<KnowledgeArticle>> {
    user.require(VIEW_KNOWLEDGE)?;
    Ok(Json(knowledge::read_article(state.pool(), id).await?))
}

/// POST /api/knowledge/articles
pub async fn create_article(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<KnowledgeArticleInput>,
) -> AppResult<Json<KnowledgeArticle>> {
    user.require(MANAGE_KNOWLEDGE)?;
    payload.validate()?;
    Ok(Json(knowledge::create_article(state.pool(), &user, &payload).await?))
}

/// PUT /api/knowledge/articles/{id} - 作者或管理员
pub async fn update_article(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<KnowledgeArticleInput>,
) -> AppResult<Json<KnowledgeArticle>> {
    payload.validate()?;
    Ok(Json(knowledge::update_article(state.pool(), &user, id, &payload).await?))
}

/// DELETE /api/knowledge/articles/{id}
pub async fn delete_article(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require(MANAGE_KNOWLEDGE)?;
    knowledge::delete_article(state.pool(), id).await?;
    Ok(Json(ApiResponse::ok_with_message("文章已删除")))
}
