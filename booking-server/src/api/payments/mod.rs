//! Payment API 模块

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::permissions::{PAYMENTS_CREATE, PAYMENTS_REFUND};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/create-intent", post(handler::create_intent))
        .route("/confirm", post(handler::confirm))
        .layer(middleware::from_fn(require_permission(PAYMENTS_CREATE)));

    let refund_routes = Router::new()
        .route("/refund", post(handler::refund))
        .layer(middleware::from_fn(require_permission(PAYMENTS_REFUND)));

    // 服务商回调: 无令牌，靠签名校验
    let webhook_routes = Router::new().route("/webhook", post(handler::webhook));

    customer_routes.merge(refund_routes).merge(webhook_routes)
}
