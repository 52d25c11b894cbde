//! Reservation and payment state machines
//!
//! ```text
//! confirmed ──cancel (now < start)──▶ cancelled
//!     │
//!     └──complete (now >= start)──▶ completed
//!
//! pending ──▶ paid ──▶ refunded      (paid ▶ paid is a no-op)
//! ```

use chrono::NaiveDateTime;
use shared::models::{PaymentStatus, ReservationStatus};

use crate::booking::{BookingError, BookingResult};

/// Outcome of a payment status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentChange {
    Apply,
    /// Already in the target state (repeated webhook confirmation)
    Unchanged,
}

/// Validate `current -> target` at wall-clock `now` for a slot starting at `starts_at`
///
/// Terminal states are checked before any time rule.
pub fn check_status_transition(
    current: ReservationStatus,
    target: ReservationStatus,
    starts_at: NaiveDateTime,
    now: NaiveDateTime,
) -> BookingResult<()> {
    if current.is_terminal() || current == target {
        return Err(BookingError::InvalidTransition {
            from: current.as_str(),
            to: target.as_str(),
        });
    }

    match target {
        ReservationStatus::Cancelled if now >= starts_at => Err(BookingError::TooLateToCancel),
        ReservationStatus::Completed if now < starts_at => Err(BookingError::TooEarlyToComplete),
        ReservationStatus::Cancelled | ReservationStatus::Completed => Ok(()),
        // confirmed is only ever an initial state
        ReservationStatus::Confirmed => Err(BookingError::InvalidTransition {
            from: current.as_str(),
            to: target.as_str(),
        }),
    }
}

pub fn check_payment_transition(
    current: PaymentStatus,
    target: PaymentStatus,
) -> BookingResult<PaymentChange> {
    match (current, target) {
        (PaymentStatus::Pending, PaymentStatus::Paid) => Ok(PaymentChange::Apply),
        (PaymentStatus::Paid, PaymentStatus::Refunded) => Ok(PaymentChange::Apply),
        (PaymentStatus::Paid, PaymentStatus::Paid) => Ok(PaymentChange::Unchanged),
        (from, to) => Err(BookingError::InvalidTransition {
            from: from.as_str(),
            to: to.as_str(),
        }),
    }
}
