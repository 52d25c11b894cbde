//! Reservation Model

use super::serde_helpers;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Reservation lifecycle status
///
/// `confirmed` is the initial state; `cancelled` and `completed` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// How the party pays (事前決済 / 現地払い)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Online,
    Onsite,
}

/// Payment side-channel status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

/// Unit of concurrency control: one restaurant, one date, one start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeslotKey {
    pub restaurant_id: i64,
    pub date: NaiveDate,
    #[serde(with = "serde_helpers::hhmm")]
    pub time: NaiveTime,
}

impl TimeslotKey {
    /// `time` is truncated to the minute; 18:00:30 and 18:00 are the same slot
    pub fn new(restaurant_id: i64, date: NaiveDate, time: NaiveTime) -> Self {
        let time = time
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(time);
        Self {
            restaurant_id,
            date,
            time,
        }
    }

    /// Stable slot label, `YYYY-MM-DDTHH:MM`
    pub fn slot_id(&self) -> String {
        format!("{}T{}", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"))
    }

    /// Wall-clock instant the slot starts, in the business timezone
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub restaurant_id: i64,
    pub customer_id: i64,
    pub reservation_date: NaiveDate,
    #[serde(with = "serde_helpers::hhmm")]
    pub reservation_time: NaiveTime,
    pub party_size: u32,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: ReservationStatus,
    /// JPY, no minor unit
    pub amount: i64,
    pub payment_intent_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    pub fn timeslot(&self) -> TimeslotKey {
        TimeslotKey::new(self.restaurant_id, self.reservation_date, self.reservation_time)
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.timeslot().starts_at()
    }

    /// Holds seats for its timeslot
    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub restaurant_id: i64,
    pub reservation_date: NaiveDate,
    #[serde(with = "serde_helpers::hhmm")]
    pub reservation_time: NaiveTime,
    /// Signed so zero and negatives reach validation
    pub party_size: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub amount: i64,
    pub notes: Option<String>,
}

/// Reservation joined with the restaurant name (customer view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationWithRestaurant {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub restaurant_name: String,
}

/// Reservation joined with customer contact (store view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationWithCustomer {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub customer_name: String,
    pub customer_email: String,
}

/// Store-side listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// Why a timeslot cannot take a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    RestaurantInactive,
    PastDate,
    ClosedDay,
    OutsideOpeningHours,
    InsufficientCapacity,
}

impl UnavailableReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::RestaurantInactive => "Restaurant is not accepting reservations",
            Self::PastDate => "Requested time is in the past",
            Self::ClosedDay => "Restaurant is closed on the requested date",
            Self::OutsideOpeningHours => "Requested time is outside opening hours",
            Self::InsufficientCapacity => "Not enough seats available",
        }
    }
}

/// Result of an availability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    pub restaurant_id: i64,
    pub date: NaiveDate,
    #[serde(with = "serde_helpers::hhmm")]
    pub time: NaiveTime,
    pub party_size: u32,
    pub total_capacity: u32,
    pub reserved_capacity: u32,
    pub remaining: u32,
    pub reason: Option<UnavailableReason>,
    pub message: String,
}

/// Aggregated sales over non-cancelled reservations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub restaurant_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub total_reservations: u64,
    pub total_sales: i64,
    pub online_reservations: u64,
    pub online_sales: i64,
    pub onsite_reservations: u64,
    pub onsite_sales: i64,
}

impl SalesSummary {
    pub fn record(&mut self, reservation: &Reservation) {
        self.total_reservations += 1;
        self.total_sales += reservation.amount;
        match reservation.payment_method {
            PaymentMethod::Online => {
                self.online_reservations += 1;
                self.online_sales += reservation.amount;
            }
            PaymentMethod::Onsite => {
                self.onsite_reservations += 1;
                self.onsite_sales += reservation.amount;
            }
        }
    }
}

/// Platform-wide sales (admin view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSalesSummary {
    #[serde(flatten)]
    pub sales: SalesSummary,
    pub active_restaurants: u64,
    pub average_per_restaurant: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Reservation {
        Reservation {
            id: 1,
            restaurant_id: 7,
            customer_id: 3,
            reservation_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            reservation_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            party_size: 2,
            payment_method: PaymentMethod::Online,
            payment_status: PaymentStatus::Pending,
            status: ReservationStatus::Confirmed,
            amount: 8000,
            payment_intent_id: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_slot_id_format() {
        let key = sample().timeslot();
        assert_eq!(key.slot_id(), "2025-01-15T18:00");
        assert_eq!(key.restaurant_id, 7);
    }

    #[test]
    fn test_key_ignores_seconds() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let exact = TimeslotKey::new(7, date, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        let late = TimeslotKey::new(7, date, NaiveTime::from_hms_milli_opt(18, 0, 30, 250).unwrap());
        assert_eq!(exact, late);
        assert_eq!(late.time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(late.slot_id(), "2025-01-15T18:00");
    }

    #[test]
    fn test_reservation_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["reservation_time"], "18:00");
        assert_eq!(json["reservation_date"], "2025-01-15");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["payment_method"], "online");
        assert_eq!(json["payment_status"], "pending");
    }

    #[test]
    fn test_create_accepts_seconds() {
        let body = r#"{
            "restaurant_id": 7,
            "reservation_date": "2025-01-15",
            "reservation_time": "18:00:00",
            "party_size": 2,
            "payment_method": "onsite"
        }"#;
        let create: ReservationCreate = serde_json::from_str(body).unwrap();
        assert_eq!(create.reservation_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(create.amount, 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
    }

    #[test]
    fn test_sales_summary_splits_by_method() {
        let mut summary = SalesSummary::default();
        summary.record(&sample());
        let mut onsite = sample();
        onsite.payment_method = PaymentMethod::Onsite;
        onsite.amount = 3000;
        summary.record(&onsite);

        assert_eq!(summary.total_reservations, 2);
        assert_eq!(summary.total_sales, 11000);
        assert_eq!(summary.online_sales, 8000);
        assert_eq!(summary.onsite_reservations, 1);
    }
}
