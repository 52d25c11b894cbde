//! Availability Engine
//!
//! Decides whether a (restaurant, date, time, party size) request can be
//! seated. Stateless: reads the directory, the registry and the ledger, and
//! judges "now" through the business clock.
//!
//! Checks run in a fixed order and the first failing one is reported:
//!
//! 1. party size >= 1 (error, not a rejection)
//! 2. restaurant exists (error)
//! 3. restaurant is active
//! 4. date is not before today (business timezone)
//! 5. date is not a closing day
//! 6. time is inside opening hours
//! 7. reserved + party size <= total capacity
//!
//! A positive answer is advisory. Bookings re-run the same check under the
//! timeslot lock in the coordinator.

use chrono::{NaiveDate, NaiveTime};
use shared::models::{Availability, Restaurant, TimeslotKey, UnavailableReason};

use crate::booking::{BookingError, BookingResult};
use crate::ledger::ReservationLedger;
use crate::registry::SeatRegistry;
use crate::restaurants::RestaurantDirectory;
use crate::utils::BusinessClock;

#[derive(Debug, Clone)]
pub struct AvailabilityEngine {
    directory: RestaurantDirectory,
    registry: SeatRegistry,
    ledger: ReservationLedger,
    clock: BusinessClock,
}

/// Party size as a validated positive count
pub fn validate_party_size(party_size: i64) -> BookingResult<u32> {
    if party_size < 1 {
        return Err(BookingError::InvalidPartySize(party_size));
    }
    u32::try_from(party_size).map_err(|_| BookingError::InvalidPartySize(party_size))
}

impl AvailabilityEngine {
    pub fn new(
        directory: RestaurantDirectory,
        registry: SeatRegistry,
        ledger: ReservationLedger,
        clock: BusinessClock,
    ) -> Self {
        Self {
            directory,
            registry,
            ledger,
            clock,
        }
    }

    pub fn check_availability(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        party_size: i64,
    ) -> BookingResult<Availability> {
        let party_size = validate_party_size(party_size)?;
        let restaurant = self.directory.get(restaurant_id)?;
        self.evaluate(&restaurant, date, time, party_size)
    }

    /// Run checks 3-7 against an already loaded restaurant
    pub fn evaluate(
        &self,
        restaurant: &Restaurant,
        date: NaiveDate,
        time: NaiveTime,
        party_size: u32,
    ) -> BookingResult<Availability> {
        let key = TimeslotKey::new(restaurant.id, date, time);
        let total_capacity = self.registry.total_capacity(restaurant.id)?;
        let reserved_capacity = self.ledger.reserved_capacity(&key)?;
        let remaining = total_capacity.saturating_sub(reserved_capacity);

        let reason = if !restaurant.is_active() {
            Some(UnavailableReason::RestaurantInactive)
        } else if key.date < self.clock.local_now().date() {
            Some(UnavailableReason::PastDate)
        } else if restaurant.closing_days.is_closed(date) {
            Some(UnavailableReason::ClosedDay)
        } else if !restaurant.opening_hours.contains(key.time) {
            Some(UnavailableReason::OutsideOpeningHours)
        } else if reserved_capacity.saturating_add(party_size) > total_capacity {
            Some(UnavailableReason::InsufficientCapacity)
        } else {
            None
        };

        let message = match reason {
            Some(reason) => reason.message().to_string(),
            None => format!("{} seats available", remaining),
        };

        tracing::debug!(
            restaurant_id = restaurant.id,
            slot = %key.slot_id(),
            party_size,
            total_capacity,
            reserved_capacity,
            reason = ?reason,
            "Availability evaluated"
        );

        Ok(Availability {
            available: reason.is_none(),
            restaurant_id: restaurant.id,
            date,
            time: key.time,
            party_size,
            total_capacity,
            reserved_capacity,
            remaining,
            reason,
            message,
        })
    }

    /// `Ok(())` when bookable, otherwise `Rejected(reason)`
    pub fn ensure_bookable(
        &self,
        restaurant: &Restaurant,
        date: NaiveDate,
        time: NaiveTime,
        party_size: u32,
    ) -> BookingResult<Availability> {
        let availability = self.evaluate(restaurant, date, time, party_size)?;
        match availability.reason {
            Some(reason) => Err(BookingError::Rejected(reason)),
            None => Ok(availability),
        }
    }
}
