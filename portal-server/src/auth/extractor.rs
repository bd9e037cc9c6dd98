//! CurrentUser Extractor
//!
//! 处理器直接以 [`CurrentUser`] 作为参数；用户由 [`require_auth`](super::require_auth)
//! 注入，未经过中间件时按请求头重新认证。

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_from_header)
            .ok_or_else(AppError::not_authenticated)?;

        let user = super::middleware::authenticate(state, token, parts.uri.path()).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
