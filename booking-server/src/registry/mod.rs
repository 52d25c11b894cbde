//! Seat/Capacity Registry
//!
//! Per-restaurant inventory of bookable units. The total capacity of a
//! restaurant is the sum of its seat capacities; the availability engine
//! compares it against the ledger's reserved capacity per timeslot.
//!
//! Every mutation holds the restaurant lock exclusively, so it can never
//! interleave with a booking's check-then-commit (bookings hold it shared).

use std::sync::Arc;

use shared::models::{Seat, SeatCreate, SeatUpdate};

use crate::booking::{BookingError, BookingResult, LockTable};
use crate::ledger::ReservationLedger;
use crate::storage::{BookingStorage, StorageError};
use crate::utils::BusinessClock;

#[derive(Debug, Clone)]
pub struct SeatRegistry {
    storage: BookingStorage,
    ledger: ReservationLedger,
    locks: Arc<LockTable<i64>>,
    clock: BusinessClock,
}

fn validate_capacity(capacity: i64) -> BookingResult<u32> {
    if capacity <= 0 {
        return Err(BookingError::InvalidCapacity(capacity));
    }
    u32::try_from(capacity).map_err(|_| BookingError::InvalidCapacity(capacity))
}

/// Restaurant total must fit in `u32`
fn checked_total(capacities: impl IntoIterator<Item = u32>) -> BookingResult<u32> {
    let total: u64 = capacities.into_iter().map(u64::from).sum();
    u32::try_from(total)
        .map_err(|_| BookingError::InvalidCapacity(i64::try_from(total).unwrap_or(i64::MAX)))
}

fn validate_name(name: &str) -> BookingResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookingError::validation("Seat name must not be empty"));
    }
    Ok(name.to_string())
}

impl SeatRegistry {
    pub fn new(
        storage: BookingStorage,
        ledger: ReservationLedger,
        locks: Arc<LockTable<i64>>,
        clock: BusinessClock,
    ) -> Self {
        Self {
            storage,
            ledger,
            locks,
            clock,
        }
    }

    fn ensure_restaurant(&self, restaurant_id: i64) -> BookingResult<()> {
        match self.storage.get_restaurant(restaurant_id)? {
            Some(_) => Ok(()),
            None => Err(BookingError::RestaurantNotFound(restaurant_id)),
        }
    }

    fn seat(&self, restaurant_id: i64, seat_id: i64) -> BookingResult<Seat> {
        self.storage
            .get_seat(restaurant_id, seat_id)?
            .ok_or(BookingError::SeatNotFound(seat_id))
    }

    /// Fails with `SeatInUse` if some upcoming timeslot holds more than `new_total`
    fn ensure_commitments_fit(
        &self,
        restaurant_id: i64,
        seat_id: i64,
        new_total: u32,
    ) -> BookingResult<()> {
        let held = self
            .ledger
            .future_commitments(restaurant_id, self.clock.local_now())?;
        if let Some((slot, reserved)) = held.iter().find(|(_, reserved)| **reserved > new_total) {
            tracing::warn!(
                restaurant_id,
                seat_id,
                slot = %slot.slot_id(),
                reserved,
                new_total,
                "Seat change would overbook an upcoming timeslot"
            );
            return Err(BookingError::SeatInUse { seat_id });
        }
        Ok(())
    }

    pub async fn add_seat(&self, restaurant_id: i64, payload: SeatCreate) -> BookingResult<Seat> {
        let capacity = validate_capacity(payload.capacity)?;
        let name = validate_name(&payload.name)?;

        let _guard = self.locks.exclusive(restaurant_id).await?;
        self.ensure_restaurant(restaurant_id)?;
        checked_total([self.total_capacity(restaurant_id)?, capacity])?;

        let now = self.clock.now_millis();
        let seat = Seat {
            id: shared::util::snowflake_id(),
            restaurant_id,
            name,
            capacity,
            created_at: now,
            updated_at: now,
        };
        let txn = self.storage.begin_write()?;
        self.storage.put_seat(&txn, &seat)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(restaurant_id, seat_id = seat.id, capacity, "Seat added");
        Ok(seat)
    }

    pub async fn update_seat(
        &self,
        restaurant_id: i64,
        seat_id: i64,
        payload: SeatUpdate,
    ) -> BookingResult<Seat> {
        let capacity = payload.capacity.map(validate_capacity).transpose()?;
        let name = payload.name.as_deref().map(validate_name).transpose()?;

        let _guard = self.locks.exclusive(restaurant_id).await?;
        self.ensure_restaurant(restaurant_id)?;
        let mut seat = self.seat(restaurant_id, seat_id)?;

        if let Some(capacity) = capacity
            && capacity != seat.capacity
        {
            // the seat already served a booking that has started
            if self.ledger.has_started_booking_since(
                restaurant_id,
                seat.created_at,
                self.clock.local_now(),
            )? {
                return Err(BookingError::SeatInUse { seat_id });
            }
            let others = self.total_capacity(restaurant_id)?.saturating_sub(seat.capacity);
            let new_total = checked_total([others, capacity])?;
            if capacity < seat.capacity {
                self.ensure_commitments_fit(restaurant_id, seat_id, new_total)?;
            }
            seat.capacity = capacity;
        }
        if let Some(name) = name {
            seat.name = name;
        }
        seat.updated_at = self.clock.now_millis();

        let txn = self.storage.begin_write()?;
        self.storage.put_seat(&txn, &seat)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(restaurant_id, seat_id, capacity = seat.capacity, "Seat updated");
        Ok(seat)
    }

    pub async fn remove_seat(&self, restaurant_id: i64, seat_id: i64) -> BookingResult<()> {
        let _guard = self.locks.exclusive(restaurant_id).await?;
        self.ensure_restaurant(restaurant_id)?;
        let seat = self.seat(restaurant_id, seat_id)?;

        let total = self.total_capacity(restaurant_id)?;
        self.ensure_commitments_fit(restaurant_id, seat_id, total.saturating_sub(seat.capacity))?;

        let txn = self.storage.begin_write()?;
        self.storage.delete_seat(&txn, restaurant_id, seat_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(restaurant_id, seat_id, "Seat removed");
        Ok(())
    }

    /// Seats ordered by name, then id
    pub fn list_seats(&self, restaurant_id: i64) -> BookingResult<Vec<Seat>> {
        self.ensure_restaurant(restaurant_id)?;
        let mut seats = self.storage.list_seats(restaurant_id)?;
        seats.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(seats)
    }

    pub fn total_capacity(&self, restaurant_id: i64) -> BookingResult<u32> {
        checked_total(
            self.storage
                .list_seats(restaurant_id)?
                .iter()
                .map(|s| s.capacity),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveTime};
    use shared::models::{
        ClosingDays, PaymentMethod, PaymentStatus, Reservation, ReservationStatus, Restaurant,
        RestaurantStatus,
    };

    use crate::utils::FixedClock;

    const RESTAURANT: i64 = 1;

    struct Fixture {
        registry: SeatRegistry,
        ledger: ReservationLedger,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let storage = BookingStorage::open_in_memory().unwrap();
        let restaurant = Restaurant {
            id: RESTAURANT,
            owner_id: 100,
            name: "Kappo".into(),
            description: None,
            genre: "japanese".into(),
            area: "Kyoto".into(),
            address: "Gion".into(),
            phone: "075-000-0000".into(),
            email: "kappo@example.com".into(),
            opening_hours: "17:00-23:00".parse().unwrap(),
            closing_days: ClosingDays::default(),
            image_url: None,
            status: RestaurantStatus::Active,
            created_at: 0,
            updated_at: 0,
        };
        let txn = storage.begin_write().unwrap();
        storage.put_restaurant(&txn, &restaurant).unwrap();
        txn.commit().unwrap();

        let clock = Arc::new(FixedClock::at(
            NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ));
        let business = BusinessClock::new(clock.clone(), chrono_tz::UTC);
        let ledger = ReservationLedger::new(storage.clone(), business.clone());
        let locks = Arc::new(LockTable::new("restaurant", Duration::from_millis(100)));
        Fixture {
            registry: SeatRegistry::new(storage, ledger.clone(), locks, business),
            ledger,
            clock,
        }
    }

    fn booking(id: i64, hour: u32, party_size: u32, created_at: i64) -> Reservation {
        Reservation {
            id,
            restaurant_id: RESTAURANT,
            customer_id: 5,
            reservation_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            reservation_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            party_size,
            payment_method: PaymentMethod::Onsite,
            payment_status: PaymentStatus::Pending,
            status: ReservationStatus::Confirmed,
            amount: 0,
            payment_intent_id: None,
            notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn seat(name: &str, capacity: i64) -> SeatCreate {
        SeatCreate {
            name: name.into(),
            capacity,
        }
    }

    #[tokio::test]
    async fn test_add_list_and_total() {
        let f = fixture();
        f.registry.add_seat(RESTAURANT, seat("B", 4)).await.unwrap();
        f.registry.add_seat(RESTAURANT, seat("A", 2)).await.unwrap();

        let names: Vec<String> = f
            .registry
            .list_seats(RESTAURANT)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(f.registry.total_capacity(RESTAURANT).unwrap(), 6);
    }

    #[tokio::test]
    async fn test_invalid_capacity_and_unknown_restaurant() {
        let f = fixture();
        assert!(matches!(
            f.registry.add_seat(RESTAURANT, seat("A", 0)).await,
            Err(BookingError::InvalidCapacity(0))
        ));
        assert!(matches!(
            f.registry.add_seat(RESTAURANT, seat("A", -3)).await,
            Err(BookingError::InvalidCapacity(-3))
        ));
        assert!(matches!(
            f.registry.add_seat(999, seat("A", 2)).await,
            Err(BookingError::RestaurantNotFound(999))
        ));
        assert!(matches!(
            f.registry.list_seats(999),
            Err(BookingError::RestaurantNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_total_capacity_cannot_overflow() {
        let f = fixture();
        let huge = f
            .registry
            .add_seat(RESTAURANT, seat("Hall", 3_000_000_000))
            .await
            .unwrap();
        assert!(matches!(
            f.registry.add_seat(RESTAURANT, seat("Annex", 3_000_000_000)).await,
            Err(BookingError::InvalidCapacity(6_000_000_000))
        ));

        let small = f.registry.add_seat(RESTAURANT, seat("Bar", 4)).await.unwrap();
        assert!(matches!(
            f.registry
                .update_seat(
                    RESTAURANT,
                    small.id,
                    SeatUpdate {
                        capacity: Some(u32::MAX as i64),
                        ..Default::default()
                    },
                )
                .await,
            Err(BookingError::InvalidCapacity(_))
        ));

        assert_eq!(
            f.registry.total_capacity(RESTAURANT).unwrap(),
            huge.capacity + 4
        );
        assert_eq!(f.registry.list_seats(RESTAURANT).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_seat_needed_by_future_booking() {
        let f = fixture();
        let big = f.registry.add_seat(RESTAURANT, seat("Counter", 6)).await.unwrap();
        let small = f.registry.add_seat(RESTAURANT, seat("Table", 2)).await.unwrap();
        f.ledger.append(&booking(1, 19, 5, 0)).unwrap();

        // 8 - 6 = 2 < 5 reserved at 19:00
        assert!(matches!(
            f.registry.remove_seat(RESTAURANT, big.id).await,
            Err(BookingError::SeatInUse { .. })
        ));
        // 8 - 2 = 6 >= 5
        f.registry.remove_seat(RESTAURANT, small.id).await.unwrap();
        assert_eq!(f.registry.total_capacity(RESTAURANT).unwrap(), 6);

        assert!(matches!(
            f.registry.remove_seat(RESTAURANT, small.id).await,
            Err(BookingError::SeatNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lowering_capacity_below_commitment() {
        let f = fixture();
        let s = f.registry.add_seat(RESTAURANT, seat("Counter", 6)).await.unwrap();
        f.ledger.append(&booking(1, 19, 4, s.created_at)).unwrap();

        let err = f
            .registry
            .update_seat(
                RESTAURANT,
                s.id,
                SeatUpdate {
                    capacity: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatInUse { .. }));

        let raised = f
            .registry
            .update_seat(
                RESTAURANT,
                s.id,
                SeatUpdate {
                    capacity: Some(8),
                    name: Some("Long counter".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(raised.capacity, 8);
        assert_eq!(raised.name, "Long counter");
    }

    #[tokio::test]
    async fn test_capacity_frozen_after_started_booking() {
        let f = fixture();
        let s = f.registry.add_seat(RESTAURANT, seat("Counter", 6)).await.unwrap();
        f.ledger.append(&booking(1, 18, 2, s.created_at)).unwrap();

        // 18:00 slot has started
        f.clock.advance(chrono::Duration::hours(7));
        let err = f
            .registry
            .update_seat(
                RESTAURANT,
                s.id,
                SeatUpdate {
                    capacity: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SeatInUse { .. }));

        // renaming stays allowed
        let renamed = f
            .registry
            .update_seat(
                RESTAURANT,
                s.id,
                SeatUpdate {
                    name: Some("Bar".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.capacity, 6);
    }
}
