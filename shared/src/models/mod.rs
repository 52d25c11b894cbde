//! Data models
//!
//! Shared between booking-server and its API clients.
//! All IDs are snowflake `i64` (see [`crate::util::snowflake_id`]).

pub mod payment;
pub mod reservation;
pub mod restaurant;
pub mod schedule;
pub mod seat;
pub mod serde_helpers;
pub mod user;

// Re-exports
pub use payment::*;
pub use reservation::*;
pub use restaurant::*;
pub use schedule::*;
pub use seat::*;
pub use user::*;
