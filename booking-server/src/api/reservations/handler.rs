//! Reservation API Handlers

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
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::AppResult;
use shared::models::{
    Reservation, ReservationCreate, ReservationFilter, ReservationStatus, ReservationWithCustomer,
    ReservationWithRestaurant,
};

#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    pub date_filter: Option<NaiveDate>,
    pub status_filter: Option<ReservationStatus>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// 预约当事人: 预约的顾客、餐厅店主或管理员
fn ensure_party(state: &ServerState, user: &CurrentUser, reservation: &Reservation) -> AppResult<()> {
    if user.is_admin() || reservation.customer_id == user.id {
        return Ok(());
    }
    let restaurant = state.directory.get(reservation.restaurant_id)?;
    ensure_restaurant_owner(user, &restaurant)
}

/// POST /api/reservations - 创建预约
///
/// 201 with the confirmed reservation, or 409 with a `reason` detail
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    let reservation = state.coordinator.create_reservation(user.id, payload).await?;

    tracing::info!(
        reservation_id = reservation.id,
        restaurant_id = reservation.restaurant_id,
        customer_id = user.id,
        slot = %reservation.timeslot().slot_id(),
        party_size = reservation.party_size,
        "Reservation created"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/reservations/my - 当前用户的预约 (新的在前)
pub async fn my_reservations(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ReservationWithRestaurant>>> {
    let reservations = state.ledger.list_by_customer(user.id)?;
    let mut result = Vec::with_capacity(reservations.len());
    for reservation in reservations {
        let restaurant_name = state
            .storage
            .get_restaurant(reservation.restaurant_id)?
            .map(|r| r.name)
            .unwrap_or_default();
        result.push(ReservationWithRestaurant {
            reservation,
            restaurant_name,
        });
    }
    Ok(Json(result))
}

/// GET /api/reservations/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.ledger.get(id)?;
    ensure_party(&state, &user, &reservation)?;
    Ok(Json(reservation))
}

/// PUT /api/reservations/{id}/cancel - 顾客本人或店主取消
pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.ledger.get(id)?;
    ensure_party(&state, &user, &reservation)?;
    Ok(Json(state.coordinator.cancel_reservation(id).await?))
}

/// PUT /api/reservations/{id}/complete - 店主标记来店完成
pub async fn complete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.ledger.get(id)?;
    let restaurant = state.directory.get(reservation.restaurant_id)?;
    ensure_restaurant_owner(&user, &restaurant)?;
    Ok(Json(state.coordinator.complete_reservation(id).await?))
}

/// GET /api/reservations/store/list - 店铺的预约列表
pub async fn store_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StoreListQuery>,
) -> AppResult<Json<Vec<ReservationWithCustomer>>> {
    let restaurant = state.directory.get_by_owner(user.id)?;
    let filter = ReservationFilter {
        date: query.date_filter,
        status: query.status_filter,
        skip: query.skip,
        limit: query.limit,
    };

    let reservations = state.ledger.list_by_restaurant(restaurant.id, &filter)?;
    let mut result = Vec::with_capacity(reservations.len());
    for reservation in reservations {
        let customer = state.storage.get_user(reservation.customer_id)?;
        let (customer_name, customer_email) = match customer {
            Some(c) => (c.name, c.email),
            None => {
                tracing::warn!(
                    reservation_id = reservation.id,
                    customer_id = reservation.customer_id,
                    "Reservation customer account missing"
                );
                (String::new(), String::new())
            }
        };
        result.push(ReservationWithCustomer {
            reservation,
            customer_name,
            customer_email,
        });
    }
    Ok(Json(result))
}
