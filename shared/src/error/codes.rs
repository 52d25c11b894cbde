//! Unified error codes for the booking service
//!
//! This module defines all error codes used across booking-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Restaurant errors
//! - 4xxx: Reservation errors
//! - 5xxx: Payment errors
//! - 7xxx: Seat errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Email is already registered
    EmailAlreadyRegistered = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Caller does not own the resource
    NotResourceOwner = 2004,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant is not accepting reservations
    RestaurantInactive = 3002,
    /// Owner already registered a restaurant
    RestaurantAlreadyRegistered = 3003,
    /// Opening hours could not be parsed
    InvalidOpeningHours = 3004,

    // ==================== 4xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 4001,
    /// Status transition not allowed
    InvalidTransition = 4002,
    /// Reservation can no longer be cancelled
    TooLateToCancel = 4003,
    /// Reservation cannot be completed before its timeslot
    TooEarlyToComplete = 4004,
    /// Requested time is outside opening hours
    OutsideOpeningHours = 4005,
    /// Requested date is a closing day
    ClosedDay = 4006,
    /// Requested timeslot is in the past
    PastDate = 4007,
    /// Not enough seats for the party
    InsufficientCapacity = 4008,
    /// Party size must be at least one
    InvalidPartySize = 4009,
    /// Timeslot is busy, retry later
    LockTimeout = 4010,
    /// Reservation id already exists
    DuplicateReservation = 4011,

    // ==================== 5xxx: Payment ====================
    /// Payment gateway failed
    PaymentFailed = 5001,
    /// Operation requires an online payment
    PaymentInvalidMethod = 5003,
    /// Payment already refunded
    PaymentAlreadyRefunded = 5004,
    /// Reservation already paid
    PaymentAlreadyPaid = 5006,
    /// Reservation has not been paid
    PaymentNotPaid = 5007,
    /// Payment intent not found
    PaymentIntentNotFound = 5008,
    /// Provider callback signature missing or wrong
    PaymentSignatureInvalid = 5009,

    // ==================== 7xxx: Seat ====================
    /// Seat not found
    SeatNotFound = 7001,
    /// Capacity must be positive
    InvalidCapacity = 7002,
    /// Seat is needed by future reservations
    SeatInUse = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,

    // ==================== 94xx: Storage ====================
    /// Storage full (disk space insufficient)
    StorageFull = 9401,
    /// Storage corrupted (data file damaged)
    StorageCorrupted = 9403,
    /// System busy (IO error, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            Self::Success => "Operation completed successfully",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            // Auth
            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid email or password",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",
            Self::AccountDisabled => "Account is disabled",
            Self::EmailAlreadyRegistered => "Email is already registered",

            // Permission
            Self::PermissionDenied => "Permission denied",
            Self::AdminRequired => "Admin role required",
            Self::NotResourceOwner => "You do not own this resource",

            // Restaurant
            Self::RestaurantNotFound => "Restaurant not found",
            Self::RestaurantInactive => "Restaurant is not accepting reservations",
            Self::RestaurantAlreadyRegistered => "Restaurant already registered for this owner",
            Self::InvalidOpeningHours => "Invalid opening hours",

            // Reservation
            Self::ReservationNotFound => "Reservation not found",
            Self::InvalidTransition => "Reservation status transition not allowed",
            Self::TooLateToCancel => "Reservation can no longer be cancelled",
            Self::TooEarlyToComplete => "Reservation cannot be completed before its time",
            Self::OutsideOpeningHours => "Requested time is outside opening hours",
            Self::ClosedDay => "Restaurant is closed on the requested date",
            Self::PastDate => "Requested time is in the past",
            Self::InsufficientCapacity => "Not enough seats available",
            Self::InvalidPartySize => "Party size must be at least 1",
            Self::LockTimeout => "Timeslot is busy, please retry",
            Self::DuplicateReservation => "Reservation already exists",

            // Payment
            Self::PaymentFailed => "Payment failed",
            Self::PaymentInvalidMethod => "Reservation is not an online payment",
            Self::PaymentAlreadyRefunded => "Payment already refunded",
            Self::PaymentAlreadyPaid => "Reservation already paid",
            Self::PaymentNotPaid => "Reservation has not been paid",
            Self::PaymentIntentNotFound => "Payment intent not found",
            Self::PaymentSignatureInvalid => "Payment callback signature is invalid",

            // Seat
            Self::SeatNotFound => "Seat not found",
            Self::InvalidCapacity => "Capacity must be positive",
            Self::SeatInUse => "Seat is required by upcoming reservations",

            // System
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",

            // Storage
            Self::StorageFull => "Storage full",
            Self::StorageCorrupted => "Storage corrupted",
            Self::SystemBusy => "System busy, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Raised when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::EmailAlreadyRegistered),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::NotResourceOwner),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),
            3002 => Ok(ErrorCode::RestaurantInactive),
            3003 => Ok(ErrorCode::RestaurantAlreadyRegistered),
            3004 => Ok(ErrorCode::InvalidOpeningHours),

            // Reservation
            4001 => Ok(ErrorCode::ReservationNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::TooLateToCancel),
            4004 => Ok(ErrorCode::TooEarlyToComplete),
            4005 => Ok(ErrorCode::OutsideOpeningHours),
            4006 => Ok(ErrorCode::ClosedDay),
            4007 => Ok(ErrorCode::PastDate),
            4008 => Ok(ErrorCode::InsufficientCapacity),
            4009 => Ok(ErrorCode::InvalidPartySize),
            4010 => Ok(ErrorCode::LockTimeout),
            4011 => Ok(ErrorCode::DuplicateReservation),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5004 => Ok(ErrorCode::PaymentAlreadyRefunded),
            5006 => Ok(ErrorCode::PaymentAlreadyPaid),
            5007 => Ok(ErrorCode::PaymentNotPaid),
            5008 => Ok(ErrorCode::PaymentIntentNotFound),
            5009 => Ok(ErrorCode::PaymentSignatureInvalid),

            // Seat
            7001 => Ok(ErrorCode::SeatNotFound),
            7002 => Ok(ErrorCode::InvalidCapacity),
            7003 => Ok(ErrorCode::SeatInUse),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            // Storage
            9401 => Ok(ErrorCode::StorageFull),
            9403 => Ok(ErrorCode::StorageCorrupted),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
