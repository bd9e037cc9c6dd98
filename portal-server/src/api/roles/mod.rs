//! Role & Permission API 模块
//!
//! 权限目录总览，以及内置角色权限集的查看、覆盖和恢复默认。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/permissions", get(handler::overview))
        .nest("/api/admin/roles", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/{name}/permissions",
            get(handler::get_permissions).put(handler::replace_permissions),
        )
        .route("/{name}/reset", post(handler::reset))
}
