//! Restaurant API 模块
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/restaurants | GET | 公开 |
//! | /api/restaurants/{id} | GET | 公开 |
//! | /api/restaurants/{id}/seats | GET | 公开 |
//! | /api/restaurants/{id}/availability | GET | 公开 |
//! | /api/restaurants | POST | restaurants:manage |
//! | /api/restaurants/{id} | PUT | restaurants:manage (店主) |
//! | /api/restaurants/my/store | GET | restaurants:manage |
//! | /api/restaurants/{id}/seats | POST | seats:manage (店主) |
//! | /api/restaurants/{id}/seats/{seat_id} | PUT, DELETE | seats:manage (店主) |
//! | /api/restaurants/{id}/sales | GET | sales:view (店主) |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::{RESTAURANTS_MANAGE, SALES_VIEW, SEATS_MANAGE};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes())
}

fn routes() -> Router<ServerState> {
    // 公开浏览 (require_auth 通过 is_public_route 放行)
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/seats", get(handler::list_seats))
        .route("/{id}/availability", get(handler::availability));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/my/store", get(handler::my_store))
        .layer(middleware::from_fn(require_permission(RESTAURANTS_MANAGE)));

    let seat_routes = Router::new()
        .route("/{id}/seats", post(handler::add_seat))
        .route(
            "/{id}/seats/{seat_id}",
            put(handler::update_seat).delete(handler::remove_seat),
        )
        .layer(middleware::from_fn(require_permission(SEATS_MANAGE)));

    let sales_routes = Router::new()
        .route("/{id}/sales", get(handler::sales))
        .layer(middleware::from_fn(require_permission(SALES_VIEW)));

    public_routes
        .merge(manage_routes)
        .merge(seat_routes)
        .merge(sales_routes)
}
