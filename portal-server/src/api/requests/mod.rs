//! Supply Request API 模块
//!
//! 申请 → 审批 → 发放。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/requests", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::submit))
        .route("/{id}/decision", post(handler::decide))
        .route("/{id}/issue", post(handler::issue))
}
