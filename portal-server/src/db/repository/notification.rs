//! Notification Repository

use super::{RepoError, RepoResult};
use crate::scope::notification::NotificationScope;
use shared::models::{Notification, NotificationView};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const VIEW_SELECT: &str = "SELECT n.id, n.title, n.content, n.publisher_id, \
     COALESCE(u.real_name, u.username) AS publisher_name, n.publish_time, n.is_top, \
     n.department, n.is_active FROM notifications n JOIN users u ON u.id = n.publisher_id";

/// 待写入的通知；`department` 已规范化 (全公司为 `None`)
#[derive(Debug, Clone)]
pub struct NotificationWrite {
    pub title: String,
    pub content: String,
    pub department: Option<String>,
    pub is_top: bool,
}

pub async fn find_by_id(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Notification>> {
    let row = sqlx::query_as::<_, Notification>(
        "SELECT id, title, content, publisher_id, publish_time, is_top, department, is_active \
         FROM notifications WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_view(pool: &SqlitePool, id: i64) -> RepoResult<Option<NotificationView>> {
    let row = sqlx::query_as::<_, NotificationView>(&format!("{VIEW_SELECT} WHERE n.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 有效通知列表: 置顶优先，再按发布时间倒序
pub async fn list(
    pool: &SqlitePool,
    scope: &NotificationScope,
    limit: Option<i64>,
) -> RepoResult<Vec<NotificationView>> {
    let mut qb = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    qb.push(" WHERE n.is_active = 1");
    scope.push_filter(&mut qb, "n");
    qb.push(" ORDER BY n.is_top DESC, n.publish_time DESC, n.id DESC");
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }

    let rows = qb
        .build_query_as::<NotificationView>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    conn: &mut SqliteConnection,
    publisher_id: i64,
    data: &NotificationWrite,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO notifications (title, content, publisher_id, publish_time, is_top, department, is_active) \
         VALUES (?, ?, ?, ?, ?, ?, 1) RETURNING id",
    )
    .bind(&data.title)
    .bind(&data.content)
    .bind(publisher_id)
    .bind(shared::util::now_millis())
    .bind(data.is_top)
    .bind(&data.department)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn update(pool: &SqlitePool, id: i64, data: &NotificationWrite) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE notifications SET title = ?, content = ?, department = ?, is_top = ? WHERE id = ?",
    )
    .bind(&data.title)
    .bind(&data.content)
    .bind(&data.department)
    .bind(data.is_top)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM notifications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
