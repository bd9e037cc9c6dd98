//! 账户生命周期
//!
//! 登录、注册、管理员建号与编辑、审核、角色分配、重置密码。
//! 审核与其通知消息在同一个事务里提交。

use std::time::Duration;

use shared::client::{LoginRequest, LoginResponse, RegisterResponse, UserInfo};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DEFAULT_DEPARTMENT, NewMessage, PasswordReset, RegisterRequest, User, UserCreate, UserStatus,
    UserUpdate, UserWithRoles,
};
use sqlx::SqlitePool;

use crate::auth::permissions::ROLE_USER;
use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::{
    self, RepoError, message as message_repo, role as role_repo, user as user_repo,
};
use crate::security_log;

/// 登录
///
/// 未知用户、密码错误、未审核账户都返回同一个 `InvalidCredentials`，
/// 并在判断之前等待固定时长；未知用户同样做一次 argon2 校验。
/// 真实原因只写入 security 日志。
pub async fn login(state: &ServerState, req: &LoginRequest) -> AppResult<LoginResponse> {
    let found = user_repo::find_by_username(&state.pool, &req.username).await?;

    tokio::time::sleep(Duration::from_millis(state.config.auth_fixed_delay_ms)).await;

    let user = match found {
        Some(user) if password::verify_password(&req.password, &user.password_hash) => user,
        Some(_) => return Err(login_failed(&req.username, "invalid_password")),
        None => {
            password::verify_dummy(&req.password);
            return Err(login_failed(&req.username, "user_not_found"));
        }
    };
    if !user.is_approved() {
        return Err(login_failed(&req.username, "not_approved"));
    }

    let roles = role_repo::find_by_user(&state.pool, user.id).await?;
    let current = CurrentUser::from_user(&user, &roles);
    let token = state
        .get_jwt_service()
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    user_repo::touch_last_login(&state.pool, user.id).await?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        roles = ?current.role_names(),
        "User logged in"
    );

    Ok(LoginResponse {
        token,
        user: user_info(&user, &current),
    })
}

fn login_failed(username: &str, reason: &str) -> AppError {
    security_log!("WARN", "login_failed", username = username, reason = reason);
    AppError::invalid_credentials()
}

/// 当前用户信息 (含生效权限)
pub fn user_info(user: &User, current: &CurrentUser) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username.clone(),
        real_name: user.real_name.clone(),
        department: user.department.clone(),
        status: user.status,
        roles: current.role_names(),
        permissions: current.effective_permissions(),
    }
}

pub async fn me(pool: &SqlitePool, current: &CurrentUser) -> AppResult<UserInfo> {
    let user = user_repo::find_by_id(pool, current.id)
        .await?
        .ok_or_else(|| user_not_found(current.id))?;
    Ok(user_info(&user, current))
}

/// 自助注册: 待审核状态，授予普通用户角色
pub async fn register(pool: &SqlitePool, req: &RegisterRequest) -> AppResult<RegisterResponse> {
    let data = user_repo::NewUser {
        username: req.username.trim().to_string(),
        password_hash: password::hash_password(&req.password)?,
        real_name: Some(req.real_name.clone()),
        email: Some(req.email.clone()),
        phone: shared::util::non_blank(req.phone.clone()),
        department: req.department.clone(),
        status: UserStatus::Pending,
    };
    let id = create_account(pool, &data, ROLE_USER).await?;

    tracing::info!(user_id = id, username = %data.username, "User registered, awaiting approval");
    Ok(RegisterResponse {
        id,
        username: data.username,
        status: UserStatus::Pending,
    })
}

/// 管理员建号: 直接激活，授予普通用户角色
pub async fn create_user(pool: &SqlitePool, req: &UserCreate) -> AppResult<User> {
    let data = user_repo::NewUser {
        username: req.username.trim().to_string(),
        password_hash: password::hash_password(&req.password)?,
        real_name: shared::util::non_blank(req.real_name.clone()),
        email: shared::util::non_blank(req.email.clone()),
        phone: shared::util::non_blank(req.phone.clone()),
        department: shared::util::non_blank(req.department.clone())
            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
        status: UserStatus::Active,
    };
    let id = create_account(pool, &data, ROLE_USER).await?;
    user_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))
}

async fn create_account(
    pool: &SqlitePool,
    data: &user_repo::NewUser,
    role: &str,
) -> AppResult<i64> {
    if user_repo::find_by_username(pool, &data.username)
        .await?
        .is_some()
    {
        return Err(username_taken(&data.username));
    }

    let mut tx = repository::begin(pool).await?;
    let id = user_repo::create(&mut tx, data)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => username_taken(&data.username),
            other => other.into(),
        })?;
    role_repo::assign_by_name(&mut tx, id, role).await?;
    repository::commit(tx).await?;
    Ok(id)
}

/// 管理员编辑；`status` 直接覆盖
pub async fn update_user(pool: &SqlitePool, id: i64, req: &UserUpdate) -> AppResult<User> {
    user_repo::update(pool, id, req).await.map_err(|e| match e {
        RepoError::NotFound(_) => user_not_found(id),
        RepoError::Duplicate(_) => {
            username_taken(req.username.as_deref().unwrap_or_default())
        }
        other => other.into(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Approve,
    Reject,
}

/// 审核通过，并通知该用户
pub async fn approve(pool: &SqlitePool, operator: &CurrentUser, user_id: i64) -> AppResult<User> {
    decide_registration(pool, operator, user_id, Verdict::Approve).await
}

/// 审核拒绝，并通知该用户
pub async fn reject(pool: &SqlitePool, operator: &CurrentUser, user_id: i64) -> AppResult<User> {
    decide_registration(pool, operator, user_id, Verdict::Reject).await
}

async fn decide_registration(
    pool: &SqlitePool,
    operator: &CurrentUser,
    user_id: i64,
    verdict: Verdict,
) -> AppResult<User> {
    let mut tx = repository::begin(pool).await?;
    let mut user = user_repo::find_by_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;

    let (title, content) = match verdict {
        Verdict::Approve => {
            user.approve()?;
            ("账户审核通过", "您的账户已通过管理员审核，现在可以登录系统了。")
        }
        Verdict::Reject => {
            user.reject()?;
            ("账户审核未通过", "您的账户审核未通过，请联系管理员了解详情。")
        }
    };

    if !user_repo::transition_from_pending(&mut tx, user_id, user.status).await? {
        return Err(AppError::with_message(
            ErrorCode::UserNotPending,
            "该账户已被其他管理员处理",
        ));
    }
    message_repo::insert(&mut tx, &NewMessage::new(operator.id, user_id, title, content)).await?;
    repository::commit(tx).await?;

    security_log!(
        "INFO",
        "registration_decided",
        operator_id = operator.id,
        user_id = user_id,
        status = user.status.as_str()
    );
    Ok(user)
}

/// 覆盖用户的角色分配；任一角色不存在时整体拒绝
pub async fn set_roles(pool: &SqlitePool, user_id: i64, role_ids: &[i64]) -> AppResult<UserWithRoles> {
    let user = user_repo::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    for role_id in role_ids {
        if role_repo::find_by_id(pool, *role_id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::RoleNotFound,
                format!("角色不存在: {role_id}"),
            ));
        }
    }

    let mut tx = repository::begin(pool).await?;
    role_repo::replace_user_roles(&mut tx, user_id, role_ids).await?;
    repository::commit(tx).await?;

    let with_roles = with_roles(pool, user).await?;
    security_log!(
        "INFO",
        "user_roles_replaced",
        user_id = user_id,
        roles = with_roles.roles.join(",")
    );
    Ok(with_roles)
}

pub async fn reset_password(pool: &SqlitePool, user_id: i64, req: &PasswordReset) -> AppResult<()> {
    let hash = password::hash_password(&req.new_password)?;
    user_repo::update_password(pool, user_id, &hash)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => user_not_found(user_id),
            other => other.into(),
        })?;
    security_log!("INFO", "password_reset", user_id = user_id);
    Ok(())
}

pub async fn list_users(
    pool: &SqlitePool,
    status: Option<UserStatus>,
) -> AppResult<Vec<UserWithRoles>> {
    let users = user_repo::find_all(pool, status).await?;
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        out.push(with_roles(pool, user).await?);
    }
    Ok(out)
}

async fn with_roles(pool: &SqlitePool, user: User) -> AppResult<UserWithRoles> {
    let roles = role_repo::find_by_user(pool, user.id).await?;
    Ok(UserWithRoles {
        is_approved: user.is_approved(),
        roles: roles.into_iter().map(|r| r.name).collect(),
        user,
    })
}

fn user_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
}

fn username_taken(username: &str) -> AppError {
    AppError::with_message(ErrorCode::UsernameExists, format!("用户名 {username} 已存在"))
        .with_detail("username", username)
}
