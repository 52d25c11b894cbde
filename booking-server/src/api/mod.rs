//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册、登录、当前用户
//! - [`restaurants`] - 餐厅浏览、空席查询、店铺管理、座位、销售额
//! - [`reservations`] - 预约创建、取消、完成、列表
//! - [`payments`] - 在线支付与退款
//! - [`admin`] - 餐厅审核与平台销售额

pub mod admin;
pub mod auth;
pub mod health;
pub mod payments;
pub mod reservations;
pub mod restaurants;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::{CurrentUser, require_auth};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::Restaurant;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );
    response
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health - public
        .merge(health::router())
        // Auth - register/login public, me authenticated
        .merge(auth::router())
        // Restaurants - browsing public, management store role
        .merge(restaurants::router())
        // Reservations - authenticated
        .merge(reservations::router())
        // Payments - authenticated
        .merge(payments::router())
        // Admin - admin role
        .merge(admin::router())
}

/// Build the fully configured application (middleware + state)
///
/// Used by both the HTTP server and oneshot tests.
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone())
        // ========== Tower HTTP Middleware ==========
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}

/// 餐厅归属检查: 店主本人或管理员
pub(crate) fn ensure_restaurant_owner(user: &CurrentUser, restaurant: &Restaurant) -> AppResult<()> {
    if user.is_admin() || restaurant.owner_id == user.id {
        return Ok(());
    }
    crate::security_log!(
        "WARN",
        "not_restaurant_owner",
        user_id = user.id,
        restaurant_id = restaurant.id
    );
    Err(AppError::not_owner("restaurant"))
}
