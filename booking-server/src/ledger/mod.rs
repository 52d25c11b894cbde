//! Reservation Ledger
//!
//! Append-only record of reservations. Rows are never removed; only
//! `status`, `payment_status` and `payment_intent_id` change after append,
//! each change in its own redb write transaction.
//!
//! The ledger does no locking of its own. Callers that need
//! check-then-write atomicity across requests go through the
//! [`BookingCoordinator`](crate::booking::BookingCoordinator).

mod transition;

pub use transition::{PaymentChange, check_payment_transition, check_status_transition};

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use shared::models::{
    PaymentStatus, Reservation, ReservationFilter, ReservationStatus, SalesSummary, TimeslotKey,
};

use crate::booking::{BookingError, BookingResult};
use crate::storage::{BookingStorage, StorageError};
use crate::utils::{BusinessClock, PaginationParams};

#[derive(Debug, Clone)]
pub struct ReservationLedger {
    storage: BookingStorage,
    clock: BusinessClock,
}

impl ReservationLedger {
    pub fn new(storage: BookingStorage, clock: BusinessClock) -> Self {
        Self { storage, clock }
    }

    /// Append a new reservation. An existing id fails and writes nothing.
    pub fn append(&self, reservation: &Reservation) -> BookingResult<i64> {
        let txn = self.storage.begin_write()?;
        if !self.storage.insert_reservation(&txn, reservation)? {
            txn.abort().map_err(StorageError::from)?;
            return Err(BookingError::DuplicateReservation(reservation.id));
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            reservation_id = reservation.id,
            restaurant_id = reservation.restaurant_id,
            slot = %reservation.timeslot().slot_id(),
            party_size = reservation.party_size,
            "Reservation appended"
        );
        Ok(reservation.id)
    }

    pub fn get(&self, id: i64) -> BookingResult<Reservation> {
        self.storage
            .get_reservation(id)?
            .ok_or(BookingError::ReservationNotFound(id))
    }

    /// Confirmed reservations holding seats in a timeslot, oldest first
    pub fn list_by_timeslot(&self, key: &TimeslotKey) -> BookingResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .storage
            .reservations_in_slot(key)?
            .into_iter()
            .filter(Reservation::is_confirmed)
            .collect();
        reservations.sort_by_key(|r| (r.created_at, r.id));
        Ok(reservations)
    }

    /// Sum of confirmed party sizes in a timeslot
    pub fn reserved_capacity(&self, key: &TimeslotKey) -> BookingResult<u32> {
        Ok(self
            .list_by_timeslot(key)?
            .iter()
            .map(|r| r.party_size)
            .sum())
    }

    /// Customer history, newest slot first
    pub fn list_by_customer(&self, customer_id: i64) -> BookingResult<Vec<Reservation>> {
        let mut reservations = self.storage.reservations_for_customer(customer_id)?;
        reservations.sort_by(|a, b| {
            b.reservation_date
                .cmp(&a.reservation_date)
                .then(b.reservation_time.cmp(&a.reservation_time))
                .then(b.id.cmp(&a.id))
        });
        Ok(reservations)
    }

    /// Store-side listing: date desc, time asc within a day
    pub fn list_by_restaurant(
        &self,
        restaurant_id: i64,
        filter: &ReservationFilter,
    ) -> BookingResult<Vec<Reservation>> {
        let mut reservations: Vec<Reservation> = self
            .storage
            .reservations_for_restaurant(restaurant_id)?
            .into_iter()
            .filter(|r| filter.date.is_none_or(|d| r.reservation_date == d))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .collect();
        reservations.sort_by(|a, b| {
            b.reservation_date
                .cmp(&a.reservation_date)
                .then(a.reservation_time.cmp(&b.reservation_time))
                .then(a.id.cmp(&b.id))
        });
        Ok(PaginationParams::new(filter.skip, filter.limit).apply(reservations))
    }

    /// Move a reservation to `target`, judged at the business clock's now
    pub fn update_status(&self, id: i64, target: ReservationStatus) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;
        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, id)?
            .ok_or(BookingError::ReservationNotFound(id))?;

        check_status_transition(
            reservation.status,
            target,
            reservation.starts_at(),
            self.clock.local_now(),
        )?;

        let previous = reservation.status;
        reservation.status = target;
        reservation.updated_at = self.clock.now_millis();
        self.storage.update_reservation(&txn, &reservation)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            reservation_id = id,
            from = previous.as_str(),
            to = target.as_str(),
            "Reservation status changed"
        );
        Ok(reservation)
    }

    /// Move the payment side-channel to `target`, optionally recording the intent id
    ///
    /// `paid -> paid` returns the stored row unchanged.
    pub fn update_payment_status(
        &self,
        id: i64,
        target: PaymentStatus,
        intent: Option<String>,
    ) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;
        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, id)?
            .ok_or(BookingError::ReservationNotFound(id))?;

        if check_payment_transition(reservation.payment_status, target)?
            == PaymentChange::Unchanged
        {
            txn.abort().map_err(StorageError::from)?;
            return Ok(reservation);
        }

        reservation.payment_status = target;
        if intent.is_some() {
            reservation.payment_intent_id = intent;
        }
        reservation.updated_at = self.clock.now_millis();
        self.storage.update_reservation(&txn, &reservation)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            reservation_id = id,
            payment_status = target.as_str(),
            "Payment status changed"
        );
        Ok(reservation)
    }

    /// Record a payment intent without touching the payment status
    pub fn attach_payment_intent(&self, id: i64, intent: &str) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;
        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, id)?
            .ok_or(BookingError::ReservationNotFound(id))?;
        reservation.payment_intent_id = Some(intent.to_string());
        reservation.updated_at = self.clock.now_millis();
        self.storage.update_reservation(&txn, &reservation)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(reservation)
    }

    pub fn find_by_payment_intent(&self, intent: &str) -> BookingResult<Reservation> {
        let id = self
            .storage
            .reservation_id_for_intent(intent)?
            .ok_or_else(|| BookingError::PaymentIntentNotFound(intent.to_string()))?;
        self.get(id)
    }

    /// Totals over non-cancelled reservations, optionally scoped to one
    /// restaurant and an inclusive date range
    pub fn sales_summary(
        &self,
        restaurant_id: Option<i64>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> BookingResult<SalesSummary> {
        let reservations = match restaurant_id {
            Some(id) => self.storage.reservations_for_restaurant(id)?,
            None => self.storage.all_reservations()?,
        };

        let mut summary = SalesSummary {
            restaurant_id,
            date_from,
            date_to,
            ..Default::default()
        };
        reservations
            .iter()
            .filter(|r| r.status != ReservationStatus::Cancelled)
            .filter(|r| date_from.is_none_or(|d| r.reservation_date >= d))
            .filter(|r| date_to.is_none_or(|d| r.reservation_date <= d))
            .for_each(|r| summary.record(r));
        Ok(summary)
    }

    /// Seats held per timeslot for confirmed reservations starting at or after `now`
    pub fn future_commitments(
        &self,
        restaurant_id: i64,
        now: NaiveDateTime,
    ) -> BookingResult<BTreeMap<TimeslotKey, u32>> {
        let mut held = BTreeMap::new();
        for r in self.storage.reservations_for_restaurant(restaurant_id)? {
            if r.is_confirmed() && r.starts_at() >= now {
                *held.entry(r.timeslot()).or_insert(0) += r.party_size;
            }
        }
        Ok(held)
    }

    /// Whether a non-cancelled reservation booked at or after `since_millis`
    /// has already started by `now`
    pub fn has_started_booking_since(
        &self,
        restaurant_id: i64,
        since_millis: i64,
        now: NaiveDateTime,
    ) -> BookingResult<bool> {
        Ok(self
            .storage
            .reservations_for_restaurant(restaurant_id)?
            .iter()
            .any(|r| {
                r.status != ReservationStatus::Cancelled
                    && r.created_at >= since_millis
                    && r.starts_at() < now
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveTime;
    use shared::models::PaymentMethod;

    use crate::utils::{Clock, FixedClock};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn reservation(id: i64, day: u32, hour: u32, party_size: u32) -> Reservation {
        Reservation {
            id,
            restaurant_id: 1,
            customer_id: 42,
            reservation_date: date(day),
            reservation_time: time(hour),
            party_size,
            payment_method: PaymentMethod::Online,
            payment_status: PaymentStatus::Pending,
            status: ReservationStatus::Confirmed,
            amount: 1000 * party_size as i64,
            payment_intent_id: None,
            notes: None,
            created_at: id,
            updated_at: id,
        }
    }

    // 2025-01-15 12:00 UTC
    fn ledger_at() -> (ReservationLedger, Arc<FixedClock>) {
        let now = Arc::new(FixedClock::at(date(15).and_hms_opt(12, 0, 0).unwrap()));
        let clock = BusinessClock::new(now.clone(), chrono_tz::UTC);
        (
            ReservationLedger::new(BookingStorage::open_in_memory().unwrap(), clock),
            now,
        )
    }

    fn ledger() -> ReservationLedger {
        ledger_at().0
    }

    #[test]
    fn test_append_and_reserved_capacity() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 4)).unwrap();
        ledger.append(&reservation(2, 15, 18, 4)).unwrap();
        ledger.append(&reservation(3, 15, 19, 2)).unwrap();

        let key = TimeslotKey::new(1, date(15), time(18));
        assert_eq!(ledger.reserved_capacity(&key).unwrap(), 8);
        assert_eq!(ledger.list_by_timeslot(&key).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_append_writes_nothing() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 4)).unwrap();
        let err = ledger.append(&reservation(1, 16, 12, 2)).unwrap_err();
        assert!(matches!(err, BookingError::DuplicateReservation(1)));

        let stored = ledger.get(1).unwrap();
        assert_eq!(stored.reservation_date, date(15));
        let other = TimeslotKey::new(1, date(16), time(12));
        assert_eq!(ledger.reserved_capacity(&other).unwrap(), 0);
    }

    #[test]
    fn test_cancel_releases_capacity_and_is_terminal() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 4)).unwrap();

        let cancelled = ledger
            .update_status(1, ReservationStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        let key = TimeslotKey::new(1, date(15), time(18));
        assert_eq!(ledger.reserved_capacity(&key).unwrap(), 0);

        let err = ledger
            .update_status(1, ReservationStatus::Cancelled)
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition { .. }));
        assert_eq!(ledger.get(1).unwrap().status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_update_missing_reservation() {
        let ledger = ledger();
        assert!(matches!(
            ledger.update_status(9, ReservationStatus::Cancelled),
            Err(BookingError::ReservationNotFound(9))
        ));
    }

    #[test]
    fn test_customer_and_restaurant_ordering() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 12, 2)).unwrap();
        ledger.append(&reservation(2, 15, 18, 2)).unwrap();
        ledger.append(&reservation(3, 16, 12, 2)).unwrap();

        let mine: Vec<i64> = ledger
            .list_by_customer(42)
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(mine, vec![3, 2, 1]);

        let store: Vec<i64> = ledger
            .list_by_restaurant(1, &ReservationFilter::default())
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(store, vec![3, 1, 2]);

        let filtered = ledger
            .list_by_restaurant(
                1,
                &ReservationFilter {
                    date: Some(date(15)),
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_payment_flow_and_intent_lookup() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 2)).unwrap();
        ledger.attach_payment_intent(1, "pi_abc").unwrap();

        let paid = ledger
            .update_payment_status(1, PaymentStatus::Paid, None)
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.payment_intent_id.as_deref(), Some("pi_abc"));

        // repeated confirmation is a no-op
        let again = ledger
            .update_payment_status(1, PaymentStatus::Paid, None)
            .unwrap();
        assert_eq!(again.updated_at, paid.updated_at);

        assert_eq!(ledger.find_by_payment_intent("pi_abc").unwrap().id, 1);
        assert!(matches!(
            ledger.find_by_payment_intent("pi_missing"),
            Err(BookingError::PaymentIntentNotFound(_))
        ));
    }

    #[test]
    fn test_updated_at_follows_business_clock() {
        let (ledger, now) = ledger_at();
        ledger.append(&reservation(1, 15, 18, 2)).unwrap();
        let noon = now.now().timestamp_millis();

        let cancelled = ledger
            .update_status(1, ReservationStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.updated_at, noon);

        ledger.append(&reservation(2, 15, 18, 2)).unwrap();
        now.advance(chrono::Duration::minutes(5));
        let attached = ledger.attach_payment_intent(2, "pi_later").unwrap();
        assert_eq!(attached.updated_at, noon + 5 * 60 * 1000);

        now.advance(chrono::Duration::minutes(5));
        let paid = ledger
            .update_payment_status(2, PaymentStatus::Paid, None)
            .unwrap();
        assert_eq!(paid.updated_at, noon + 10 * 60 * 1000);
    }

    #[test]
    fn test_replaced_intent_no_longer_resolves() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 2)).unwrap();
        ledger.attach_payment_intent(1, "pi_first").unwrap();
        ledger.attach_payment_intent(1, "pi_second").unwrap();

        assert_eq!(ledger.find_by_payment_intent("pi_second").unwrap().id, 1);
        assert!(matches!(
            ledger.find_by_payment_intent("pi_first"),
            Err(BookingError::PaymentIntentNotFound(_))
        ));

        // re-attaching the same id keeps it resolvable
        ledger.attach_payment_intent(1, "pi_second").unwrap();
        assert_eq!(ledger.find_by_payment_intent("pi_second").unwrap().id, 1);
    }

    #[test]
    fn test_sales_summary_skips_cancelled() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 2)).unwrap();
        let mut onsite = reservation(2, 16, 18, 3);
        onsite.payment_method = PaymentMethod::Onsite;
        ledger.append(&onsite).unwrap();
        ledger.append(&reservation(3, 17, 18, 4)).unwrap();
        ledger
            .update_status(3, ReservationStatus::Cancelled)
            .unwrap();

        let summary = ledger.sales_summary(Some(1), None, None).unwrap();
        assert_eq!(summary.total_reservations, 2);
        assert_eq!(summary.total_sales, 5000);
        assert_eq!(summary.onsite_sales, 3000);

        let ranged = ledger.sales_summary(None, Some(date(16)), None).unwrap();
        assert_eq!(ranged.total_reservations, 1);
    }

    #[test]
    fn test_future_commitments() {
        let ledger = ledger();
        ledger.append(&reservation(1, 15, 18, 2)).unwrap();
        ledger.append(&reservation(2, 15, 18, 3)).unwrap();
        ledger.append(&reservation(3, 10, 18, 6)).unwrap();
        let now = date(12).and_hms_opt(0, 0, 0).unwrap();

        let held = ledger.future_commitments(1, now).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held.values().copied().max(), Some(5));
        assert!(ledger.has_started_booking_since(1, 0, now).unwrap());
        assert!(!ledger.has_started_booking_since(1, 4, now).unwrap());
    }
}
