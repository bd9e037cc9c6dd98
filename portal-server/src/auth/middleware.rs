//! 认证中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, AppResult};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::db::repository::{role as role_repo, user as user_repo};
use crate::security_log;

/// 不需要登录的接口
const PUBLIC_PATHS: &[&str] = &["/api/health", "/api/auth/login", "/api/auth/register"];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，再从数据库加载
/// 账户与角色，构建 [`CurrentUser`] 注入请求扩展。账户被停用或尚未审核
/// 时，已签发的令牌立即失效。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - [`PUBLIC_PATHS`]
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
/// | 账户不存在或未审核 | 401 AccountDisabled |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_PATHS.contains(&path)
    {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().to_string());
            return Err(AppError::not_authenticated());
        }
    };

    let user = authenticate(&state, token, req.uri().path()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 验证令牌并加载当前用户
pub async fn authenticate(state: &ServerState, token: &str, uri: &str) -> AppResult<CurrentUser> {
    let claims = match state.get_jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri);
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };
    let user_id = claims
        .user_id()
        .map_err(|e| AppError::invalid_token(e.to_string()))?;

    let pool = state.pool();
    let user = match user_repo::find_by_id(pool, user_id).await? {
        Some(user) if user.is_approved() => user,
        _ => {
            security_log!("WARN", "auth_account_rejected", user_id = user_id, uri = uri);
            return Err(AppError::new(shared::ErrorCode::AccountDisabled));
        }
    };
    let roles = role_repo::find_by_user(pool, user.id).await?;
    Ok(CurrentUser::from_user(&user, &roles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::ROLE_USER;
    use crate::db::repository::user as user_repo;
    use crate::testing;
    use shared::ErrorCode;
    use shared::models::{UserStatus, UserUpdate};

    #[tokio::test]
    async fn test_authenticate_loads_roles_fresh() {
        let pool = testing::pool_with_roles().await;
        let user = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let state = testing::test_state(pool.clone());
        let token = testing::token_for(&state, &user);

        let current = authenticate(&state, &token, "/api/auth/me").await.unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.department, "技术部");
        assert!(current.has_role(ROLE_USER));
    }

    #[tokio::test]
    async fn test_deactivated_account_token_rejected() {
        let pool = testing::pool_with_roles().await;
        let user = testing::create_user(&pool, "zhangsan", "技术部", ROLE_USER).await;
        let state = testing::test_state(pool.clone());
        let token = testing::token_for(&state, &user);

        let update = UserUpdate {
            username: None,
            real_name: None,
            email: None,
            phone: None,
            department: None,
            status: Some(UserStatus::Inactive),
        };
        user_repo::update(&pool, user.id, &update).await.unwrap();

        let err = authenticate(&state, &token, "/api/auth/me").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccountDisabled);
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let pool = testing::pool_with_roles().await;
        let state = testing::test_state(pool);
        let err = authenticate(&state, "not-a-jwt", "/api/auth/me").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
