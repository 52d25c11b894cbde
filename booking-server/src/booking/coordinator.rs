//! Booking Transaction Coordinator
//!
//! Serializes create / cancel / complete / payment updates per timeslot.
//!
//! ```text
//! create:  restaurant lock (shared) ─▶ timeslot lock (exclusive)
//!          ─▶ re-check availability ─▶ ledger append ─▶ release
//! cancel / complete / payment:
//!          timeslot lock (exclusive) ─▶ re-read ─▶ ledger update ─▶ release
//! ```
//!
//! Lock waits are bounded; a timeout surfaces as `LockTimeout` and is never
//! retried here.

use std::sync::Arc;
use std::time::Duration;

use shared::models::{
    PaymentStatus, Reservation, ReservationCreate, ReservationStatus, TimeslotKey,
};

use super::{BookingError, BookingResult, LockTable};
use crate::availability::{AvailabilityEngine, validate_party_size};
use crate::ledger::ReservationLedger;
use crate::restaurants::RestaurantDirectory;
use crate::utils::BusinessClock;

#[derive(Debug)]
pub struct BookingCoordinator {
    directory: RestaurantDirectory,
    engine: AvailabilityEngine,
    ledger: ReservationLedger,
    clock: BusinessClock,
    restaurant_locks: Arc<LockTable<i64>>,
    slot_locks: LockTable<TimeslotKey>,
}

impl BookingCoordinator {
    pub fn new(
        directory: RestaurantDirectory,
        engine: AvailabilityEngine,
        ledger: ReservationLedger,
        clock: BusinessClock,
        restaurant_locks: Arc<LockTable<i64>>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            engine,
            ledger,
            clock,
            restaurant_locks,
            slot_locks: LockTable::new("timeslot", lock_timeout),
        }
    }

    /// Live timeslot lock entries
    pub fn active_slot_locks(&self) -> usize {
        self.slot_locks.len()
    }

    /// Live restaurant lock entries (shared with the registry)
    pub fn active_restaurant_locks(&self) -> usize {
        self.restaurant_locks.len()
    }

    pub fn lock_timeout(&self) -> Duration {
        self.slot_locks.timeout()
    }

    pub async fn create_reservation(
        &self,
        customer_id: i64,
        request: ReservationCreate,
    ) -> BookingResult<Reservation> {
        let party_size = validate_party_size(request.party_size)?;
        if request.amount < 0 {
            return Err(BookingError::validation("amount must not be negative"));
        }

        let key = TimeslotKey::new(
            request.restaurant_id,
            request.reservation_date,
            request.reservation_time,
        );
        let _restaurant_guard = self.restaurant_locks.shared(key.restaurant_id).await?;
        let _slot_guard = self.slot_locks.exclusive(key).await?;

        let restaurant = self.directory.get(key.restaurant_id)?;
        if let Err(err) = self
            .engine
            .ensure_bookable(&restaurant, key.date, key.time, party_size)
        {
            if let BookingError::Rejected(reason) = &err {
                tracing::info!(
                    restaurant_id = key.restaurant_id,
                    slot = %key.slot_id(),
                    party_size,
                    customer_id,
                    reason = ?reason,
                    "Reservation rejected"
                );
            }
            return Err(err);
        }

        let now = self.clock.now_millis();
        let reservation = Reservation {
            id: shared::util::snowflake_id(),
            restaurant_id: key.restaurant_id,
            customer_id,
            reservation_date: key.date,
            reservation_time: key.time,
            party_size,
            payment_method: request.payment_method,
            payment_status: PaymentStatus::Pending,
            status: ReservationStatus::Confirmed,
            amount: request.amount,
            payment_intent_id: None,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        self.ledger.append(&reservation)?;
        Ok(reservation)
    }

    pub async fn cancel_reservation(&self, id: i64) -> BookingResult<Reservation> {
        self.transition(id, ReservationStatus::Cancelled).await
    }

    pub async fn complete_reservation(&self, id: i64) -> BookingResult<Reservation> {
        self.transition(id, ReservationStatus::Completed).await
    }

    async fn transition(&self, id: i64, target: ReservationStatus) -> BookingResult<Reservation> {
        let key = self.ledger.get(id)?.timeslot();
        let _slot_guard = self.slot_locks.exclusive(key).await?;
        self.ledger.update_status(id, target)
    }

    /// Payment side-channel update under the reservation's timeslot lock
    pub async fn record_payment(
        &self,
        id: i64,
        status: PaymentStatus,
        intent: Option<String>,
    ) -> BookingResult<Reservation> {
        let key = self.ledger.get(id)?.timeslot();
        let _slot_guard = self.slot_locks.exclusive(key).await?;
        self.ledger.update_payment_status(id, status, intent)
    }

    pub async fn attach_payment_intent(&self, id: i64, intent: &str) -> BookingResult<Reservation> {
        let key = self.ledger.get(id)?.timeslot();
        let _slot_guard = self.slot_locks.exclusive(key).await?;
        self.ledger.attach_payment_intent(id, intent)
    }
}
