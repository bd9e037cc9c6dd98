//! Knowledge Repository (知识库分类 + 文章)

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{
    CategoryTree, KnowledgeArticle, KnowledgeArticleInput, KnowledgeCategory,
    KnowledgeCategoryInput,
};
use sqlx::SqlitePool;

const CATEGORY_COLUMNS: &str = "id, name, description, parent_id, created_at";
const ARTICLE_COLUMNS: &str = "id, title, content, category_id, author_id, publish_time, update_time, is_published, view_count, tags";

// ── Categories ──────────────────────────────────────────────

pub async fn find_categories(pool: &SqlitePool) -> RepoResult<Vec<KnowledgeCategory>> {
    let rows = sqlx::query_as::<_, KnowledgeCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM knowledge_categories ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// 整个分类树 (arena)
pub async fn load_tree(pool: &SqlitePool) -> RepoResult<CategoryTree> {
    Ok(CategoryTree::new(find_categories(pool).await?))
}

pub async fn find_category(pool: &SqlitePool, id: i64) -> RepoResult<Option<KnowledgeCategory>> {
    let row = sqlx::query_as::<_, KnowledgeCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM knowledge_categories WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create_category(
    pool: &SqlitePool,
    data: &KnowledgeCategoryInput,
) -> RepoResult<KnowledgeCategory> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO knowledge_categories (name, description, parent_id, created_at) \
         VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.parent_id)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    find_category(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create knowledge category".into()))
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    data: &KnowledgeCategoryInput,
) -> RepoResult<KnowledgeCategory> {
    let rows = sqlx::query(
        "UPDATE knowledge_categories SET name = ?, description = ?, parent_id = ? WHERE id = ?",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.parent_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(category_not_found(id));
    }
    find_category(pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

/// 删除分类；有子分类或文章时拒绝
pub async fn delete_category(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let children: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_categories WHERE parent_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if children > 0 {
        return Err(RepoError::Business(
            ErrorCode::KnowledgeCategoryHasChildren,
            "该分类下存在子分类，无法删除！".into(),
        ));
    }

    let articles: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_articles WHERE category_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if articles > 0 {
        return Err(RepoError::Business(
            ErrorCode::KnowledgeCategoryHasArticles,
            "该分类下存在文章，无法删除！".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM knowledge_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(category_not_found(id));
    }
    Ok(())
}

fn category_not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::KnowledgeCategoryNotFound,
        format!("Knowledge category {id} not found"),
    )
}

// ── Articles ────────────────────────────────────────────────

/// 最新发布的文章
pub async fn find_recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<KnowledgeArticle>> {
    let rows = sqlx::query_as::<_, KnowledgeArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM knowledge_articles WHERE is_published = 1 \
         ORDER BY publish_time DESC, id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_category(
    pool: &SqlitePool,
    category_id: i64,
) -> RepoResult<Vec<KnowledgeArticle>> {
    let rows = sqlx::query_as::<_, KnowledgeArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM knowledge_articles WHERE category_id = ? AND is_published = 1 \
         ORDER BY publish_time DESC, id DESC"
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_article(pool: &SqlitePool, id: i64) -> RepoResult<Option<KnowledgeArticle>> {
    let row = sqlx::query_as::<_, KnowledgeArticle>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM knowledge_articles WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// 浏览次数 +1 并返回最新内容
pub async fn view_article(pool: &SqlitePool, id: i64) -> RepoResult<KnowledgeArticle> {
    let row = sqlx::query_as::<_, KnowledgeArticle>(&format!(
        "UPDATE knowledge_articles SET view_count = view_count + 1 WHERE id = ? RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| article_not_found(id))
}

pub async fn create_article(
    pool: &SqlitePool,
    author_id: i64,
    data: &KnowledgeArticleInput,
) -> RepoResult<KnowledgeArticle> {
    let row = sqlx::query_as::<_, KnowledgeArticle>(&format!(
        "INSERT INTO knowledge_articles (title, content, category_id, author_id, publish_time, update_time, is_published, view_count, tags) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, 0, ?7) RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(&data.title)
    .bind(&data.content)
    .bind(data.category_id)
    .bind(author_id)
    .bind(shared::util::now_millis())
    .bind(data.is_published)
    .bind(&data.tags)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_article(
    pool: &SqlitePool,
    id: i64,
    data: &KnowledgeArticleInput,
) -> RepoResult<KnowledgeArticle> {
    let row = sqlx::query_as::<_, KnowledgeArticle>(&format!(
        "UPDATE knowledge_articles SET title = ?, content = ?, category_id = ?, tags = ?, is_published = ?, update_time = ? \
         WHERE id = ? RETURNING {ARTICLE_COLUMNS}"
    ))
    .bind(&data.title)
    .bind(&data.content)
    .bind(data.category_id)
    .bind(&data.tags)
    .bind(data.is_published)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| article_not_found(id))
}

pub async fn delete_article(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM knowledge_articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(article_not_found(id));
    }
    Ok(())
}

fn article_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::ArticleNotFound, format!("Article {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::ROLE_USER;
    use crate::testing;

    fn category(name: &str, parent_id: Option<i64>) -> KnowledgeCategoryInput {
        KnowledgeCategoryInput {
            name: name.into(),
            description: None,
            parent_id,
        }
    }

    fn article(title: &str, category_id: Option<i64>, published: bool) -> KnowledgeArticleInput {
        KnowledgeArticleInput {
            title: title.into(),
            content: "正文".into(),
            category_id,
            tags: Some("入职,指南".into()),
            is_published: published,
        }
    }

    #[tokio::test]
    async fn test_delete_blocked_by_children_and_articles() {
        let pool = testing::pool_with_roles().await;
        let author = testing::create_user(&pool, "admin", "行政部", ROLE_USER).await;
        let root = create_category(&pool, &category("公司制度", None)).await.unwrap();
        let child = create_category(&pool, &category("考勤", Some(root.id)))
            .await
            .unwrap();

        let err = delete_category(&pool, root.id).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::KnowledgeCategoryHasChildren, _)
        ));

        let a = create_article(&pool, author.id, &article("考勤制度", Some(child.id), true))
            .await
            .unwrap();
        let err = delete_category(&pool, child.id).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::KnowledgeCategoryHasArticles, _)
        ));

        delete_article(&pool, a.id).await.unwrap();
        delete_category(&pool, child.id).await.unwrap();
        delete_category(&pool, root.id).await.unwrap();
        assert!(load_tree(&pool).await.unwrap().roots().is_empty());
    }

    #[tokio::test]
    async fn test_view_count_and_published_filter() {
        let pool = testing::pool_with_roles().await;
        let author = testing::create_user(&pool, "admin", "行政部", ROLE_USER).await;
        let cat = create_category(&pool, &category("培训资料", None)).await.unwrap();
        let published = create_article(&pool, author.id, &article("入职指南", Some(cat.id), true))
            .await
            .unwrap();
        create_article(&pool, author.id, &article("草稿", Some(cat.id), false))
            .await
            .unwrap();

        assert_eq!(find_by_category(&pool, cat.id).await.unwrap().len(), 1);
        assert_eq!(find_recent(&pool, 10).await.unwrap().len(), 1);

        view_article(&pool, published.id).await.unwrap();
        let viewed = view_article(&pool, published.id).await.unwrap();
        assert_eq!(viewed.view_count, 2);
        assert!(view_article(&pool, 999).await.is_err());
    }
}
