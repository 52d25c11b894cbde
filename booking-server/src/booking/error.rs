//! Booking domain errors
//!
//! Every component below the HTTP layer (registry, ledger, availability,
//! coordinator, payments) reports failures through [`BookingError`]. The
//! conversion into [`AppError`] picks the numeric code, and through it the
//! HTTP status.

use shared::models::UnavailableReason;
use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::{AppError, ErrorCode};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("Party size must be at least 1 (got {0})")]
    InvalidPartySize(i64),

    #[error("Seat capacity must be positive and keep the restaurant total within u32 (got {0})")]
    InvalidCapacity(i64),

    #[error("Seat {seat_id} is needed by existing reservations")]
    SeatInUse { seat_id: i64 },

    #[error("Restaurant {0} not found")]
    RestaurantNotFound(i64),

    #[error("No restaurant registered for this account")]
    NoRestaurantForOwner(i64),

    #[error("Seat {0} not found")]
    SeatNotFound(i64),

    #[error("Reservation {0} not found")]
    ReservationNotFound(i64),

    #[error("Payment intent {0} not found")]
    PaymentIntentNotFound(String),

    #[error("Cannot change {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Reservation can no longer be cancelled")]
    TooLateToCancel,

    #[error("Reservation cannot be completed before its start time")]
    TooEarlyToComplete,

    #[error("{}", .0.message())]
    Rejected(UnavailableReason),

    #[error("Timed out waiting for the {0} lock")]
    LockTimeout(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("Reservation {0} already exists")]
    DuplicateReservation(i64),

    #[error("Owner {0} already has a restaurant")]
    RestaurantAlreadyRegistered(i64),

    #[error("Email {0} is already registered")]
    EmailAlreadyRegistered(String),

    #[error("Only online reservations can be paid online")]
    InvalidPaymentMethod,

    #[error("Reservation {0} is already paid")]
    AlreadyPaid(i64),

    #[error("Reservation {0} is not paid")]
    NotPaid(i64),

    #[error("Reservation {0} is already refunded")]
    AlreadyRefunded(i64),

    #[error("Payment callback signature is invalid")]
    InvalidSignature,

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl BookingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

fn reason_code(reason: UnavailableReason) -> ErrorCode {
    match reason {
        UnavailableReason::RestaurantInactive => ErrorCode::RestaurantInactive,
        UnavailableReason::PastDate => ErrorCode::PastDate,
        UnavailableReason::ClosedDay => ErrorCode::ClosedDay,
        UnavailableReason::OutsideOpeningHours => ErrorCode::OutsideOpeningHours,
        UnavailableReason::InsufficientCapacity => ErrorCode::InsufficientCapacity,
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::Validation(msg) => AppError::validation(msg),
            BookingError::InvalidPartySize(n) => {
                AppError::with_message(ErrorCode::InvalidPartySize, message)
                    .with_detail("party_size", n)
            }
            BookingError::InvalidCapacity(n) => {
                AppError::with_message(ErrorCode::InvalidCapacity, message)
                    .with_detail("capacity", n)
            }
            BookingError::SeatInUse { seat_id } => {
                AppError::with_message(ErrorCode::SeatInUse, message)
                    .with_detail("seat_id", seat_id)
            }
            BookingError::RestaurantNotFound(_) => {
                AppError::with_message(ErrorCode::RestaurantNotFound, message)
            }
            BookingError::NoRestaurantForOwner(owner_id) => {
                AppError::with_message(ErrorCode::RestaurantNotFound, message)
                    .with_detail("owner_id", owner_id)
            }
            BookingError::SeatNotFound(_) => AppError::with_message(ErrorCode::SeatNotFound, message),
            BookingError::ReservationNotFound(_) => {
                AppError::with_message(ErrorCode::ReservationNotFound, message)
            }
            BookingError::PaymentIntentNotFound(_) => {
                AppError::with_message(ErrorCode::PaymentIntentNotFound, message)
            }
            BookingError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("from", from)
                    .with_detail("to", to)
            }
            BookingError::TooLateToCancel => {
                AppError::with_message(ErrorCode::TooLateToCancel, message)
            }
            BookingError::TooEarlyToComplete => {
                AppError::with_message(ErrorCode::TooEarlyToComplete, message)
            }
            BookingError::Rejected(reason) => {
                AppError::rejected(reason_code(reason), message, serde_json::json!(reason))
            }
            BookingError::LockTimeout(scope) => {
                tracing::warn!(scope, "Lock acquisition timed out");
                AppError::lock_timeout(scope)
            }
            BookingError::Forbidden(msg) => AppError::forbidden(msg),
            BookingError::DuplicateReservation(_) => {
                AppError::with_message(ErrorCode::DuplicateReservation, message)
            }
            BookingError::RestaurantAlreadyRegistered(_) => {
                AppError::with_message(ErrorCode::RestaurantAlreadyRegistered, message)
            }
            BookingError::EmailAlreadyRegistered(_) => {
                AppError::with_message(ErrorCode::EmailAlreadyRegistered, message)
            }
            BookingError::InvalidPaymentMethod => {
                AppError::with_message(ErrorCode::PaymentInvalidMethod, message)
            }
            BookingError::AlreadyPaid(_) => {
                AppError::with_message(ErrorCode::PaymentAlreadyPaid, message)
            }
            BookingError::NotPaid(_) => AppError::with_message(ErrorCode::PaymentNotPaid, message),
            BookingError::AlreadyRefunded(_) => {
                AppError::with_message(ErrorCode::PaymentAlreadyRefunded, message)
            }
            BookingError::InvalidSignature => {
                AppError::with_message(ErrorCode::PaymentSignatureInvalid, message)
            }
            BookingError::PaymentGateway(msg) => {
                tracing::error!(error = %msg, "Payment gateway failure");
                AppError::with_message(ErrorCode::PaymentFailed, message)
            }
            BookingError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                e.into()
            }
        }
    }
}
