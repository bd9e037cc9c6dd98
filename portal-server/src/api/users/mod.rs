//! User Administration API 模块
//!
//! 账号生命周期 (审核 / 拒绝 / 停用)、角色分配与重置密码。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/roles", put(handler::set_roles))
        .route("/{id}/reset-password", post(handler::reset_password))
}
