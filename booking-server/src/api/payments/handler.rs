//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, State},
    http::HeaderMap,
};

use crate::api::ensure_restaurant_owner;
use crate::auth::CurrentUser;
use crate::booking::BookingError;
use crate::core::ServerState;
use crate::payments::SIGNATURE_HEADER;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{
    PaymentConfirm, PaymentIntentCreate, PaymentIntentResponse, PaymentWebhookAck, RefundCreate,
    RefundResponse, Reservation,
};

fn ensure_customer(user: &CurrentUser, reservation: &Reservation) -> AppResult<()> {
    if user.is_admin() || reservation.customer_id == user.id {
        Ok(())
    } else {
        Err(AppError::not_owner("reservation"))
    }
}

/// POST /api/payments/create-intent - 为在线支付的预约创建支付意图
pub async fn create_intent(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PaymentIntentCreate>,
) -> AppResult<Json<PaymentIntentResponse>> {
    let reservation = state.ledger.get(payload.reservation_id)?;
    ensure_customer(&user, &reservation)?;
    Ok(Json(state.payments.create_intent(&reservation).await?))
}

/// POST /api/payments/confirm - 客户端支付完成后确认 (向服务商核实，幂等)
pub async fn confirm(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PaymentConfirm>,
) -> AppResult<Json<Reservation>> {
    validate_required_text(
        &payload.payment_intent_id,
        "payment_intent_id",
        MAX_SHORT_TEXT_LEN,
    )?;
    let reservation = state
        .ledger
        .find_by_payment_intent(&payload.payment_intent_id)?;
    ensure_customer(&user, &reservation)?;
    Ok(Json(state.payments.confirm(&payload.payment_intent_id).await?))
}

/// POST /api/payments/webhook - 支付服务商回调 (签名校验，无需令牌)
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<PaymentWebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(BookingError::InvalidSignature)?;
    Ok(Json(state.payments.handle_webhook(&body, signature).await?))
}

/// POST /api/payments/refund - 店主全额退款
pub async fn refund(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RefundCreate>,
) -> AppResult<Json<RefundResponse>> {
    let reservation = state.ledger.get(payload.reservation_id)?;
    let restaurant = state.directory.get(reservation.restaurant_id)?;
    ensure_restaurant_owner(&user, &restaurant)?;
    let (_, refund) = state.payments.refund(&reservation).await?;
    Ok(Json(refund))
}
