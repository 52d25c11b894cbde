//! Error codes and the HTTP error envelope
//!
//! Every failure that reaches a client is an [`AppError`]: a numeric
//! [`ErrorCode`] (which fixes the HTTP status), a message and optional
//! details. Booking rejections all map to 409 and carry a `reason` detail;
//! lock timeouts map to 503 so clients know to retry.
//!
//! | Range | Category |
//! |-------|----------|
//! | 0xxx | general / validation |
//! | 1xxx | authentication |
//! | 2xxx | permission and ownership |
//! | 3xxx | restaurant |
//! | 4xxx | reservation and availability |
//! | 5xxx | payment |
//! | 7xxx | seat |
//! | 9xxx | system and storage |
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::rejected(
//!     ErrorCode::InsufficientCapacity,
//!     "Not enough seats",
//!     "insufficient_capacity",
//! );
//! assert_eq!(err.http_status().as_u16(), 409);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
