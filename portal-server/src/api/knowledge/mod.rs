//! Knowledge Base API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/knowledge", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::home))
        .route("/categories", post(handler::create_category))
        .route(
            "/categories/{id}",
            get(handler::category_page)
                .put(handler::update_category)
                .delete(handler::delete_category),
        )
        .route("/articles", post(handler::create_article))
        .route(
            "/articles/{id}",
            get(handler::get_article)
                .put(handler::update_article)
                .delete(handler::delete_article),
        )
}
