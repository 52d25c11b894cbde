//! Admin API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{PlatformSalesSummary, Restaurant, RestaurantStatus};

#[derive(Debug, Deserialize)]
pub struct RestaurantQuery {
    pub status_filter: Option<RestaurantStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// GET /api/admin/restaurants?status_filter - 全部餐厅 (可按状态过滤)
pub async fn list_restaurants(
    State(state): State<ServerState>,
    Query(query): Query<RestaurantQuery>,
) -> AppResult<Json<Vec<Restaurant>>> {
    Ok(Json(state.directory.list_all(query.status_filter)?))
}

/// PUT /api/admin/restaurants/{id}/approve - 审核通过，开始接受预约
pub async fn approve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    let restaurant = state
        .directory
        .set_status(id, RestaurantStatus::Active)
        .await?;
    tracing::info!(restaurant_id = id, admin_id = user.id, "Restaurant approved");
    Ok(Json(restaurant))
}

/// PUT /api/admin/restaurants/{id}/suspend - 停止接受预约 (已有预约保留)
pub async fn suspend(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    let restaurant = state
        .directory
        .set_status(id, RestaurantStatus::Inactive)
        .await?;
    tracing::info!(restaurant_id = id, admin_id = user.id, "Restaurant suspended");
    Ok(Json(restaurant))
}

/// GET /api/admin/sales/summary?date_from&date_to - 平台销售额
pub async fn sales_summary(
    State(state): State<ServerState>,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<PlatformSalesSummary>> {
    if let (Some(from), Some(to)) = (query.date_from, query.date_to)
        && from > to
    {
        return Err(AppError::validation("date_from must not be after date_to"));
    }
    let sales = state
        .ledger
        .sales_summary(None, query.date_from, query.date_to)?;
    let active_restaurants = state
        .directory
        .list_all(Some(RestaurantStatus::Active))?
        .len() as u64;
    let average_per_restaurant = if active_restaurants == 0 {
        0
    } else {
        sales.total_sales / active_restaurants as i64
    };

    Ok(Json(PlatformSalesSummary {
        sales,
        active_restaurants,
        average_per_restaurant,
    }))
}
