//! Message Repository

use super::RepoResult;
use crate::scope::message::{LIST_ORDER, MessageScope};
use shared::models::{Message, MessageFilter, MessageView, NewMessage};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};

const VIEW_SELECT: &str = "SELECT m.id, m.title, m.content, m.sender_id, \
     COALESCE(s.real_name, s.username) AS sender_name, m.recipient_id, m.message_type, m.category, \
     m.target_department, m.is_read, m.related_url, m.created_at \
     FROM messages m JOIN users s ON s.id = m.sender_id";

pub async fn insert(conn: &mut SqliteConnection, msg: &NewMessage) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO messages (title, content, sender_id, recipient_id, message_type, category, target_department, is_read, related_url, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?) RETURNING id",
    )
    .bind(msg.title())
    .bind(msg.content())
    .bind(msg.sender_id())
    .bind(msg.recipient_id())
    .bind(msg.message_type())
    .bind(msg.category())
    .bind(msg.target_department())
    .bind(msg.related_url())
    .bind(shared::util::now_millis())
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Message>> {
    let row = sqlx::query_as::<_, Message>(
        "SELECT id, title, content, sender_id, recipient_id, message_type, category, target_department, \
         is_read, related_url, created_at FROM messages WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_view(pool: &SqlitePool, id: i64) -> RepoResult<Option<MessageView>> {
    let row = sqlx::query_as::<_, MessageView>(&format!("{VIEW_SELECT} WHERE m.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// 可见消息: 未读在前，新消息在前
pub async fn list(
    pool: &SqlitePool,
    scope: &MessageScope,
    filter: MessageFilter,
) -> RepoResult<Vec<MessageView>> {
    let mut qb = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
    qb.push(" WHERE 1 = 1");
    scope.push_filter(&mut qb, filter);
    qb.push(LIST_ORDER);

    let rows = qb.build_query_as::<MessageView>().fetch_all(pool).await?;
    Ok(rows)
}

/// 未读数只计收件人是本人的消息
pub async fn count_unread(pool: &SqlitePool, recipient_id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE recipient_id = ? AND is_read = 0")
            .bind(recipient_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// 幂等；已读时不报错
pub async fn mark_read(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE messages SET is_read = 1 WHERE id = ? AND is_read = 0")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::ROLE_USER;
    use crate::testing;

    async fn send(pool: &SqlitePool, msg: NewMessage) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        insert(&mut conn, &msg).await.unwrap()
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_USER).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let id = send(&pool, NewMessage::new(admin.id, zhang.id, "欢迎", "欢迎使用")).await;

        mark_read(&pool, id).await.unwrap();
        mark_read(&pool, id).await.unwrap();
        let msg = find_by_id(&pool, id).await.unwrap().unwrap();
        assert!(msg.is_read);
        assert_eq!(count_unread(&pool, zhang.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listing_includes_department_broadcasts() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_USER).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let li = testing::create_user(&pool, "lisi", "人事部", ROLE_USER).await;

        send(&pool, NewMessage::new(admin.id, zhang.id, "私信", "c")).await;
        send(
            &pool,
            NewMessage::new(admin.id, admin.id, "技术部广播", "c").broadcast(Some("技术部".into())),
        )
        .await;
        send(
            &pool,
            NewMessage::new(admin.id, admin.id, "全员广播", "c").broadcast(None),
        )
        .await;

        let zhang_scope = MessageScope {
            user_id: zhang.id,
            department: zhang.department.clone(),
        };
        let all = list(&pool, &zhang_scope, MessageFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);
        let personal = list(&pool, &zhang_scope, MessageFilter::Personal).await.unwrap();
        assert_eq!(personal.len(), 1);
        assert_eq!(personal[0].title, "私信");

        let li_scope = MessageScope {
            user_id: li.id,
            department: li.department.clone(),
        };
        let titles: Vec<String> = list(&pool, &li_scope, MessageFilter::Notification)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["全员广播".to_string()]);
    }

    #[tokio::test]
    async fn test_unread_sorted_first() {
        let pool = testing::pool_with_roles().await;
        let admin = testing::create_user(&pool, "admin", "行政部", ROLE_USER).await;
        let zhang = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let first = send(&pool, NewMessage::new(admin.id, zhang.id, "旧", "c")).await;
        let second = send(&pool, NewMessage::new(admin.id, zhang.id, "新", "c")).await;
        mark_read(&pool, second).await.unwrap();

        let scope = MessageScope {
            user_id: zhang.id,
            department: zhang.department.clone(),
        };
        let rows = list(&pool, &scope, MessageFilter::All).await.unwrap();
        assert_eq!(rows[0].id, first);
        assert_eq!(rows[0].sender_name, "admin");
        assert_eq!(list(&pool, &scope, MessageFilter::Unread).await.unwrap().len(), 1);
    }
}
