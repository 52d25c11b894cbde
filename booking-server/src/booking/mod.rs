//! Booking engine core: domain errors, keyed locks and the transaction coordinator

mod coordinator;
mod error;
mod locks;

pub use coordinator::BookingCoordinator;
pub use error::{BookingError, BookingResult};
pub use locks::{LockGuard, LockTable};
