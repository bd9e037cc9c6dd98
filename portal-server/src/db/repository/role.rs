//! Role Repository

use super::{RepoError, RepoResult};
use shared::models::Role;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, description, permissions, level";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM roles ORDER BY level, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {COLUMNS} FROM roles WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(role)
}

pub async fn find_by_name(db: impl SqliteExecutor<'_>, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM roles WHERE name = ? LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(role)
}

/// Roles assigned to a user, ordered by level
pub async fn find_by_user(db: impl SqliteExecutor<'_>, user_id: i64) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name, r.description, r.permissions, r.level FROM roles r \
         JOIN user_roles ur ON ur.role_id = r.id WHERE ur.user_id = ? ORDER BY r.level, r.id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(roles)
}

/// Insert a role unless one with the same name exists. Returns whether a row was added.
pub async fn insert_if_missing(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    permissions: &str,
    level: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT INTO roles (name, description, permissions, level) VALUES (?, ?, ?, ?) \
         ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(description)
    .bind(permissions)
    .bind(level)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Overwrite the persisted permission string of a role
pub async fn update_permissions(
    pool: &SqlitePool,
    name: &str,
    permissions: &str,
) -> RepoResult<Role> {
    let rows = sqlx::query("UPDATE roles SET permissions = ? WHERE name = ?")
        .bind(permissions)
        .bind(name)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Role {name} not found")));
    }
    find_by_name(pool, name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {name} not found")))
}

/// Grant a role by name (no-op when already granted)
pub async fn assign_by_name(
    conn: &mut SqliteConnection,
    user_id: i64,
    role_name: &str,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO user_roles (user_id, role_id) \
         SELECT ?, id FROM roles WHERE name = ?",
    )
    .bind(user_id)
    .bind(role_name)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        let (exists,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles WHERE name = ?")
            .bind(role_name)
            .fetch_one(&mut *conn)
            .await?;
        if exists == 0 {
            return Err(RepoError::NotFound(format!("Role {role_name} not found")));
        }
    }
    Ok(())
}

/// Replace the whole role assignment of a user
pub async fn replace_user_roles(
    conn: &mut SqliteConnection,
    user_id: i64,
    role_ids: &[i64],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for role_id in role_ids {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
