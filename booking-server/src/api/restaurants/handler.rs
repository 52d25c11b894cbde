//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::ensure_restaurant_owner;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_email,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::serde_helpers::parse_hhmm;
use shared::models::{
    Availability, OpeningHours, Restaurant, RestaurantCreate, RestaurantDetail, RestaurantFilter,
    RestaurantUpdate, SalesSummary, Seat, SeatCreate, SeatUpdate,
};

/// Public listing query. Status is not selectable here; only active restaurants are listed.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub genre: Option<String>,
    pub area: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub time: String,
    pub party_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// GET /api/restaurants - 营业中的餐厅列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Restaurant>>> {
    let filter = RestaurantFilter {
        status: None,
        genre: query.genre,
        area: query.area,
        skip: query.skip,
        limit: query.limit,
    };
    Ok(Json(state.directory.list(&filter)?))
}

/// GET /api/restaurants/{id} - 餐厅详情 (含座位)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RestaurantDetail>> {
    let restaurant = state.directory.get(id)?;
    let seats = state.registry.list_seats(id)?;
    Ok(Json(RestaurantDetail { restaurant, seats }))
}

/// GET /api/restaurants/{id}/seats
pub async fn list_seats(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Seat>>> {
    Ok(Json(state.registry.list_seats(id)?))
}

/// GET /api/restaurants/{id}/availability?date&time&party_size - 空席查询
pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    let time = parse_hhmm(&query.time)
        .ok_or_else(|| AppError::validation(format!("Invalid time: {}", query.time)))?;
    let availability = state
        .engine
        .check_availability(id, query.date, time, query.party_size)?;
    Ok(Json(availability))
}

fn validate_profile(payload: &RestaurantCreate) -> AppResult<()> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.genre, "genre", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.area, "area", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_email(&payload.email)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    validate_opening_hours(&payload.opening_hours)
}

fn validate_opening_hours(hours: &OpeningHours) -> AppResult<()> {
    if hours.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::InvalidOpeningHours,
            "opening_hours must not be empty",
        )
        .with_detail("field", "opening_hours"));
    }
    Ok(())
}

/// POST /api/restaurants - 店铺登记 (待审核)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RestaurantCreate>,
) -> AppResult<(StatusCode, Json<Restaurant>)> {
    validate_profile(&payload)?;
    let restaurant = state.directory.create(user.id, payload)?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// PUT /api/restaurants/{id} - 更新店铺资料
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<Restaurant>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(genre) = &payload.genre {
        validate_required_text(genre, "genre", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(area) = &payload.area {
        validate_required_text(area, "area", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    if let Some(hours) = &payload.opening_hours {
        validate_opening_hours(hours)?;
    }

    owned_restaurant(&state, &user, id)?;
    Ok(Json(state.directory.update(id, payload).await?))
}

/// GET /api/restaurants/my/store - 当前店主的餐厅
pub async fn my_store(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<RestaurantDetail>> {
    let restaurant = state.directory.get_by_owner(user.id)?;
    let seats = state.registry.list_seats(restaurant.id)?;
    Ok(Json(RestaurantDetail { restaurant, seats }))
}

fn owned_restaurant(state: &ServerState, user: &CurrentUser, id: i64) -> AppResult<Restaurant> {
    let restaurant = state.directory.get(id)?;
    ensure_restaurant_owner(user, &restaurant)?;
    Ok(restaurant)
}

/// POST /api/restaurants/{id}/seats
pub async fn add_seat(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SeatCreate>,
) -> AppResult<(StatusCode, Json<Seat>)> {
    validate_required_text(&payload.name, "name", MAX_SHORT_TEXT_LEN)?;
    owned_restaurant(&state, &user, id)?;
    let seat = state.registry.add_seat(id, payload).await?;
    Ok((StatusCode::CREATED, Json(seat)))
}

/// PUT /api/restaurants/{id}/seats/{seat_id}
pub async fn update_seat(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, seat_id)): Path<(i64, i64)>,
    Json(payload): Json<SeatUpdate>,
) -> AppResult<Json<Seat>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_SHORT_TEXT_LEN)?;
    }
    owned_restaurant(&state, &user, id)?;
    Ok(Json(state.registry.update_seat(id, seat_id, payload).await?))
}

/// DELETE /api/restaurants/{id}/seats/{seat_id}
pub async fn remove_seat(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, seat_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    owned_restaurant(&state, &user, id)?;
    state.registry.remove_seat(id, seat_id).await?;
    Ok(Json(true))
}

/// GET /api/restaurants/{id}/sales?date_from&date_to - 店铺销售额
pub async fn sales(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<SalesSummary>> {
    if let (Some(from), Some(to)) = (query.date_from, query.date_to)
        && from > to
    {
        return Err(AppError::validation("date_from must not be after date_to"));
    }
    owned_restaurant(&state, &user, id)?;
    Ok(Json(
        state.ledger.sales_summary(Some(id), query.date_from, query.date_to)?,
    ))
}
