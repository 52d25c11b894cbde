//! Admin API 模块
//!
//! 餐厅审核 (approve / suspend) 与平台销售额，仅管理员

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/restaurants", get(handler::list_restaurants))
        .route("/restaurants/{id}/approve", put(handler::approve))
        .route("/restaurants/{id}/suspend", put(handler::suspend))
        .route("/sales/summary", get(handler::sales_summary))
        .layer(middleware::from_fn(require_admin))
}
