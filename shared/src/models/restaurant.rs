//! Restaurant Model

use super::schedule::{ClosingDays, OpeningHours};
use super::seat::Seat;
use serde::{Deserialize, Serialize};

/// Approval status (店舗審査状態)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantStatus {
    /// Awaiting admin approval
    #[default]
    Pending,
    /// Approved, accepts reservations
    Active,
    /// Suspended by an admin
    Inactive,
}

impl RestaurantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub genre: String,
    pub area: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub opening_hours: OpeningHours,
    #[serde(default)]
    pub closing_days: ClosingDays,
    pub image_url: Option<String>,
    pub status: RestaurantStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Restaurant {
    pub fn is_active(&self) -> bool {
        self.status == RestaurantStatus::Active
    }
}

/// Restaurant with its seats (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub seats: Vec<Seat>,
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    pub description: Option<String>,
    pub genre: String,
    pub area: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub opening_hours: OpeningHours,
    pub closing_days: Option<ClosingDays>,
    pub image_url: Option<String>,
}

/// Update restaurant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub closing_days: Option<ClosingDays>,
    pub image_url: Option<String>,
}

/// Listing filter. Without an explicit status only active restaurants are listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantFilter {
    pub status: Option<RestaurantStatus>,
    pub genre: Option<String>,
    pub area: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}
