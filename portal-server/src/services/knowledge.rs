//! 知识库
//!
//! 分类树每次从数据库整体加载为 [`CategoryTree`]，面包屑与环检测都在树上查找。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    CategoryTree, KnowledgeArticle, KnowledgeArticleInput, KnowledgeCategory,
    KnowledgeCategoryInput, KnowledgeCategoryPage, KnowledgeHome,
};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::auth::guard::{Decision, Requirement};
use crate::auth::permissions::ROLE_ADMIN;
use crate::db::repository::knowledge as knowledge_repo;

/// 首页最新文章数
const RECENT_ARTICLES: i64 = 10;

pub async fn home(pool: &SqlitePool) -> AppResult<KnowledgeHome> {
    let tree = knowledge_repo::load_tree(pool).await?;
    Ok(KnowledgeHome {
        categories: tree.roots().into_iter().cloned().collect(),
        recent_articles: knowledge_repo::find_recent(pool, RECENT_ARTICLES).await?,
    })
}

pub async fn category_page(pool: &SqlitePool, id: i64) -> AppResult<KnowledgeCategoryPage> {
    let tree = knowledge_repo::load_tree(pool).await?;
    let category = tree.get(id).cloned().ok_or_else(|| category_not_found(id))?;
    Ok(KnowledgeCategoryPage {
        breadcrumb: tree.ancestors(id).into_iter().cloned().collect(),
        subcategories: tree.children(id).into_iter().cloned().collect(),
        articles: knowledge_repo::find_by_category(pool, id).await?,
        category,
    })
}

pub async fn create_category(
    pool: &SqlitePool,
    input: &KnowledgeCategoryInput,
) -> AppResult<KnowledgeCategory> {
    if let Some(parent_id) = input.parent_id {
        let tree = knowledge_repo::load_tree(pool).await?;
        ensure_exists(&tree, parent_id)?;
    }
    let category = knowledge_repo::create_category(pool, input).await?;
    tracing::info!(category_id = category.id, name = %category.name, "Knowledge category created");
    Ok(category)
}

/// 修改分类；挂到自己或自己的后代下会成环，拒绝
pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    input: &KnowledgeCategoryInput,
) -> AppResult<KnowledgeCategory> {
    let tree = knowledge_repo::load_tree(pool).await?;
    ensure_exists(&tree, id)?;
    if let Some(parent_id) = input.parent_id {
        ensure_exists(&tree, parent_id)?;
    }
    if tree.would_create_cycle(id, input.parent_id) {
        return Err(AppError::with_message(
            ErrorCode::KnowledgeCategoryCycle,
            "不能将分类移动到自身或其子分类下",
        )
        .with_detail("category_id", id));
    }
    Ok(knowledge_repo::update_category(pool, id, input).await?)
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> AppResult<()> {
    knowledge_repo::delete_category(pool, id).await?;
    tracing::info!(category_id = id, "Knowledge category deleted");
    Ok(())
}

fn ensure_exists(tree: &CategoryTree, id: i64) -> AppResult<()> {
    if tree.contains(id) {
        Ok(())
    } else {
        Err(category_not_found(id))
    }
}

async fn ensure_article_category(pool: &SqlitePool, input: &KnowledgeArticleInput) -> AppResult<()> {
    if let Some(category_id) = input.category_id
        && knowledge_repo::find_category(pool, category_id).await?.is_none()
    {
        return Err(category_not_found(category_id));
    }
    Ok(())
}

/// 阅读文章 (浏览次数 +1)
pub async fn read_article(pool: &SqlitePool, id: i64) -> AppResult<KnowledgeArticle> {
    Ok(knowledge_repo::view_article(pool, id).await?)
}

pub async fn create_article(
    pool: &SqlitePool,
    author: &CurrentUser,
    input: &KnowledgeArticleInput,
) -> AppResult<KnowledgeArticle> {
    ensure_article_category(pool, input).await?;
    let article = knowledge_repo::create_article(pool, author.id, input).await?;
    tracing::info!(article_id = article.id, author_id = author.id, "Knowledge article created");
    Ok(article)
}

/// 作者本人或管理员可以编辑
pub fn can_edit_article(user: &CurrentUser, article: &KnowledgeArticle) -> bool {
    article.author_id == user.id || user.is_super_admin() || user.has_role(ROLE_ADMIN)
}

pub async fn update_article(
    pool: &SqlitePool,
    user: &CurrentUser,
    id: i64,
    input: &KnowledgeArticleInput,
) -> AppResult<KnowledgeArticle> {
    let article = knowledge_repo::find_article(pool, id)
        .await?
        .ok_or_else(|| article_not_found(id))?;
    Decision::require(can_edit_article(user, &article), Requirement::Owner).into_result()?;
    ensure_article_category(pool, input).await?;
    Ok(knowledge_repo::update_article(pool, id, input).await?)
}

pub async fn delete_article(pool: &SqlitePool, id: i64) -> AppResult<()> {
    knowledge_repo::delete_article(pool, id).await?;
    tracing::info!(article_id = id, "Knowledge article deleted");
    Ok(())
}

fn category_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::KnowledgeCategoryNotFound,
        format!("Knowledge category {id} not found"),
    )
}

fn article_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ArticleNotFound, format!("Article {id} not found"))
}
