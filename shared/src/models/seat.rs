//! Seat Model

use serde::{Deserialize, Serialize};

/// Bookable unit of a restaurant (席)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub capacity: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create seat payload
///
/// Capacity is signed so non-positive input reaches validation instead of
/// failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatCreate {
    pub name: String,
    pub capacity: i64,
}

/// Update seat payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatUpdate {
    pub name: Option<String>,
    pub capacity: Option<i64>,
}
