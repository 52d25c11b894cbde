//! Reservation API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::{RESERVATIONS_CANCEL, RESERVATIONS_CREATE, RESERVATIONS_MANAGE};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    // 任意已登录用户 (归属在 handler 内检查)
    let read_routes = Router::new()
        .route("/my", get(handler::my_reservations))
        .route("/{id}", get(handler::get_by_id));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(RESERVATIONS_CREATE)));

    let cancel_routes = Router::new()
        .route("/{id}/cancel", put(handler::cancel))
        .layer(middleware::from_fn(require_permission(RESERVATIONS_CANCEL)));

    let store_routes = Router::new()
        .route("/{id}/complete", put(handler::complete))
        .route("/store/list", get(handler::store_list))
        .layer(middleware::from_fn(require_permission(RESERVATIONS_MANAGE)));

    read_routes
        .merge(create_routes)
        .merge(cancel_routes)
        .merge(store_routes)
}
