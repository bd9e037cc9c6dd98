//! Message API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/messages", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::send))
        .route("/unread-count", get(handler::unread_count))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/read", post(handler::mark_read))
}
