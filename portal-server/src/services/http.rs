//! HTTP 应用组装
//!
//! 合并所有 API 路由，挂上认证、请求 ID、访问日志等中间件。
//! 服务器和测试都通过 [`build_app`] 拿到同一个 Router。

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::{CurrentUser, require_auth};
use crate::core::ServerState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID generator (UUID v4)
#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// HTTP 请求日志中间件
async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    // 已认证时由 require_auth 注入
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .map(|u| format!("{}({})", u.username, u.id));

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        user = user.as_deref().unwrap_or("-"),
        "request completed"
    );
    response
}

/// 所有 API 路由 (无中间件、无状态)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(api::health::router())
        .merge(api::auth::router())
        .merge(api::dashboard::router())
        .merge(api::notifications::router())
        .merge(api::supplies::router())
        .merge(api::requests::router())
        .merge(api::messages::router())
        .merge(api::employees::router())
        .merge(api::knowledge::router())
        .merge(api::users::router())
        .merge(api::roles::router())
}

/// 带全部中间件和状态的应用
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        .layer(middleware::from_fn(log_request))
        // JWT 认证 - require_auth 内部跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, XRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use shared::models::UserStatus;
    use tower::ServiceExt;

    use crate::auth::permissions::{ROLE_ADMIN, ROLE_PENDING, ROLE_USER};
    use crate::testing;

    async fn app() -> (Router, ServerState) {
        let pool = testing::pool_with_roles().await;
        let state = testing::test_state(pool);
        (build_app(state.clone()), state)
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> http::Request<Body> {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public_and_tagged_with_request_id() {
        let (app, _) = app().await;
        let response = app
            .oneshot(request(Method::GET, "/api/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (app, _) = app().await;
        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/dashboard", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(request(Method::GET, "/api/dashboard", Some("not-a-jwt"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_then_me() {
        let (app, state) = app().await;
        testing::create_user_with_password(
            state.pool(),
            "zhangsan",
            "secret123",
            ROLE_USER,
            UserStatus::Active,
        )
        .await;

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "zhangsan", "password": "secret123" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let token = body["token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request(Method::GET, "/api/auth/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = json_body(response).await;
        assert_eq!(me["username"], "zhangsan");
        assert!(
            me["permissions"]
                .as_array()
                .unwrap()
                .contains(&json!("request_supplies"))
        );
    }

    #[tokio::test]
    async fn test_missing_permission_is_forbidden() {
        let (app, state) = app().await;
        let user = testing::create_user(state.pool(), "zhangsan", "技术部", ROLE_USER).await;
        let admin = testing::create_user(state.pool(), "admin", "行政部", ROLE_ADMIN).await;
        let notice = json!({ "title": "放假通知", "content": "国庆放假七天", "is_top": false });

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/notifications",
                Some(&testing::token_for(&state, &user)),
                Some(notice.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/notifications",
                Some(&testing::token_for(&state, &admin)),
                Some(notice),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unapproved_account_token_is_rejected() {
        let (app, state) = app().await;
        let pending =
            testing::create_user_with_status(state.pool(), "newbie", ROLE_PENDING, UserStatus::Pending)
                .await;

        let response = app
            .oneshot(request(
                Method::GET,
                "/api/messages",
                Some(&testing::token_for(&state, &pending)),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["code"], 1007);
    }
}
