//! Supply API 模块
//!
//! 申领人看到的目录在 `/api/supplies`，库存维护在 `/api/admin/supplies`。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/supplies", get(handler::catalog))
        .route("/api/supplies/inbound", post(handler::inbound))
        .nest("/api/admin/supplies", admin_routes())
        .nest("/api/supply-categories", category_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_all).post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/disable", post(handler::disable))
        .route("/{id}/enable", post(handler::enable))
}

fn category_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_categories).post(handler::create_category))
        .route(
            "/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
}
