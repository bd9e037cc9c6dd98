//! Test fixtures: in-memory database, users, server state

use std::path::PathBuf;
use std::sync::Arc;

use shared::models::{UserStatus, DEFAULT_DEPARTMENT};
use sqlx::SqlitePool;

use crate::auth::{CurrentUser, JwtConfig, JwtService, RoleBaseline, password};
use crate::core::{Config, ServerState};
use crate::db::DbService;
use crate::db::repository::{role as role_repo, user as user_repo};
use crate::services::provisioning;

/// 测试账户的占位哈希 (不可登录，避免 argon2 拖慢测试)
const PLACEHOLDER_HASH: &str = "!test-account";

/// 已迁移并写入内置角色的内存数据库
pub async fn pool_with_roles() -> SqlitePool {
    let db = DbService::in_memory().await.unwrap();
    provisioning::ensure_builtin_roles(&db.pool, &RoleBaseline::builtin())
        .await
        .unwrap();
    db.pool
}

/// 创建一个 active 账户并授予 `role`
pub async fn create_user(pool: &SqlitePool, username: &str, dept: &str, role: &str) -> CurrentUser {
    insert_user(pool, username, dept, role, UserStatus::Active, PLACEHOLDER_HASH).await
}

pub async fn create_user_with_status(
    pool: &SqlitePool,
    username: &str,
    role: &str,
    status: UserStatus,
) -> CurrentUser {
    insert_user(pool, username, DEFAULT_DEPARTMENT, role, status, PLACEHOLDER_HASH).await
}

/// 真实哈希，仅登录测试使用
pub async fn create_user_with_password(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    role: &str,
    status: UserStatus,
) -> CurrentUser {
    let hash = password::hash_password(password).unwrap();
    insert_user(pool, username, DEFAULT_DEPARTMENT, role, status, &hash).await
}

async fn insert_user(
    pool: &SqlitePool,
    username: &str,
    dept: &str,
    role: &str,
    status: UserStatus,
    password_hash: &str,
) -> CurrentUser {
    let data = user_repo::NewUser {
        username: username.into(),
        password_hash: password_hash.into(),
        real_name: None,
        email: None,
        phone: None,
        department: dept.into(),
        status,
    };

    let mut tx = pool.begin().await.unwrap();
    let id = user_repo::create(&mut tx, &data).await.unwrap();
    role_repo::assign_by_name(&mut tx, id, role).await.unwrap();
    tx.commit().await.unwrap();

    let user = user_repo::find_by_id(pool, id).await.unwrap().unwrap();
    let roles = role_repo::find_by_user(pool, id).await.unwrap();
    CurrentUser::from_user(&user, &roles)
}

/// 测试配置: 无登录延迟，固定 JWT 密钥
pub fn test_config() -> Config {
    Config {
        work_dir: std::env::temp_dir().to_string_lossy().into_owned(),
        http_port: 0,
        database_path: PathBuf::from(":memory:"),
        jwt: JwtConfig {
            secret: "test-secret-key-that-is-long-enough-for-hs256".into(),
            expiration_minutes: 60,
            issuer: "office-portal".into(),
            audience: "portal-clients".into(),
        },
        environment: "test".into(),
        log_level: "debug".into(),
        log_json: false,
        log_dir: None,
        request_timeout_ms: 5000,
        auth_fixed_delay_ms: 0,
        bootstrap_admin_username: "superadmin".into(),
        bootstrap_admin_password: None,
        seed_demo: false,
    }
}

pub fn test_state(pool: SqlitePool) -> ServerState {
    let config = test_config();
    let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
    ServerState::new(config, pool, jwt_service, Arc::new(RoleBaseline::builtin()))
}

pub fn token_for(state: &ServerState, user: &CurrentUser) -> String {
    state
        .get_jwt_service()
        .generate_token(user.id, &user.username)
        .unwrap()
}
