//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserStatus, UserUpdate};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, username, password_hash, real_name, email, phone, department, status, is_active, created_at, last_login";

/// 待写入的新账户
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: String,
    pub status: UserStatus,
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE username = ? LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// 按注册时间倒序，可按状态筛选
pub async fn find_all(pool: &SqlitePool, status: Option<UserStatus>) -> RepoResult<Vec<User>> {
    let users = match status {
        Some(status) => {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {COLUMNS} FROM users WHERE status = ? ORDER BY created_at DESC, id DESC"
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(users)
}

/// 已激活账户 (`status = active AND is_active`)
pub async fn find_approved(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE status = 'active' AND is_active = 1 ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// 插入账户，返回 id。`is_active` 跟随 `status == active`
pub async fn create(conn: &mut SqliteConnection, data: &NewUser) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash, real_name, email, phone, department, status, is_active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.username)
    .bind(&data.password_hash)
    .bind(&data.real_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.department)
    .bind(data.status)
    .bind(data.status == UserStatus::Active)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Username '{}' already exists", data.username))
        }
        other => other,
    })?;
    Ok(id)
}

/// 管理员编辑；给出 `status` 时直接覆盖 (不走审核状态机)
pub async fn update(pool: &SqlitePool, id: i64, data: &UserUpdate) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET username = COALESCE(?1, username), real_name = COALESCE(?2, real_name), \
         email = COALESCE(?3, email), phone = COALESCE(?4, phone), department = COALESCE(?5, department), \
         status = COALESCE(?6, status), is_active = (COALESCE(?6, status) = 'active') WHERE id = ?7",
    )
    .bind(&data.username)
    .bind(&data.real_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.department)
    .bind(data.status)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// 审核状态转换，只从 pending 出发。返回是否命中
pub async fn transition_from_pending(
    conn: &mut SqliteConnection,
    id: i64,
    to: UserStatus,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE users SET status = ?, is_active = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(to)
    .bind(to == UserStatus::Active)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn new_user(username: &str, status: UserStatus) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "hash".into(),
            real_name: None,
            email: None,
            phone: None,
            department: "技术部".into(),
            status,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = testing::pool_with_roles().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = create(&mut conn, &new_user("zhangsan", UserStatus::Active))
            .await
            .unwrap();
        drop(conn);

        let user = find_by_username(&pool, "zhangsan").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_approved());
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let pool = testing::pool_with_roles().await;
        let mut conn = pool.acquire().await.unwrap();
        create(&mut conn, &new_user("lisi", UserStatus::Pending))
            .await
            .unwrap();
        let err = create(&mut conn, &new_user("lisi", UserStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_transition_only_from_pending() {
        let pool = testing::pool_with_roles().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = create(&mut conn, &new_user("wangwu", UserStatus::Pending))
            .await
            .unwrap();

        assert!(transition_from_pending(&mut conn, id, UserStatus::Active).await.unwrap());
        assert!(!transition_from_pending(&mut conn, id, UserStatus::Inactive).await.unwrap());
        drop(conn);

        let user = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_admin_status_override_follows_is_active() {
        let pool = testing::pool_with_roles().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = create(&mut conn, &new_user("zhaoliu", UserStatus::Active))
            .await
            .unwrap();
        drop(conn);

        let update_data = UserUpdate {
            username: None,
            real_name: Some("赵六".into()),
            email: None,
            phone: None,
            department: None,
            status: Some(UserStatus::Inactive),
        };
        let user = update(&pool, id, &update_data).await.unwrap();
        assert_eq!(user.status, UserStatus::Inactive);
        assert!(!user.is_active);
        assert_eq!(user.real_name.as_deref(), Some("赵六"));
        assert_eq!(user.department, "技术部");

        let pending = find_all(&pool, Some(UserStatus::Inactive)).await.unwrap();
        assert_eq!(pending.len(), 1);
    }
}
