//! Employee API 模块
//!
//! 人员档案：员工记录、档案文件元数据、档案统计。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/employees", routes())
        .route("/api/archives", get(handler::archives))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/files", post(handler::add_file))
}
