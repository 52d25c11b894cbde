//! redb-based storage layer for restaurants, seats, reservations and users
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `restaurants` | `restaurant_id` | `Restaurant` | Restaurant directory |
//! | `restaurant_owners` | `owner_id` | `restaurant_id` | One restaurant per owner |
//! | `seats` | `(restaurant_id, seat_id)` | `Seat` | Seat registry |
//! | `reservations` | `reservation_id` | `Reservation` | Reservation ledger (append-only) |
//! | `reservations_by_slot` | `(restaurant_id, slot_id)` | `reservation_id` (multi) | Timeslot index |
//! | `reservations_by_customer` | `customer_id` | `reservation_id` (multi) | Customer index |
//! | `reservations_by_restaurant` | `restaurant_id` | `reservation_id` (multi) | Restaurant index |
//! | `reservations_by_intent` | `payment_intent_id` | `reservation_id` | Payment intent lookup |
//! | `users` | `user_id` | `UserRecord` | Accounts |
//! | `user_emails` | `email (lowercase)` | `user_id` | Unique email index |
//!
//! Values are JSON-serialized. Writes go through a caller-owned
//! [`WriteTransaction`] so that a record and its index entries commit together;
//! dropping the transaction without `commit()` discards everything.

mod reservations;
mod restaurants;
mod seats;
mod users;

pub use users::UserRecord;

use redb::{
    Database, MultimapTableDefinition, ReadableDatabase, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for restaurants: key = restaurant_id, value = JSON-serialized Restaurant
const RESTAURANTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("restaurants");

/// Owner → restaurant: key = owner user id, value = restaurant_id
const RESTAURANT_OWNERS_TABLE: TableDefinition<i64, i64> =
    TableDefinition::new("restaurant_owners");

/// Table for seats: key = (restaurant_id, seat_id), value = JSON-serialized Seat
const SEATS_TABLE: TableDefinition<(i64, i64), &[u8]> = TableDefinition::new("seats");

/// Table for reservations: key = reservation_id, value = JSON-serialized Reservation
const RESERVATIONS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("reservations");

/// Timeslot index: key = (restaurant_id, "YYYY-MM-DDTHH:MM"), values = reservation ids
const SLOT_INDEX: MultimapTableDefinition<(i64, &str), i64> =
    MultimapTableDefinition::new("reservations_by_slot");

/// Customer index: key = customer_id, values = reservation ids
const CUSTOMER_INDEX: MultimapTableDefinition<i64, i64> =
    MultimapTableDefinition::new("reservations_by_customer");

/// Restaurant index: key = restaurant_id, values = reservation ids
const RESTAURANT_INDEX: MultimapTableDefinition<i64, i64> =
    MultimapTableDefinition::new("reservations_by_restaurant");

/// Payment intent index: key = payment_intent_id, value = reservation_id
const INTENT_INDEX: TableDefinition<&str, i64> = TableDefinition::new("reservations_by_intent");

/// Table for users: key = user_id, value = JSON-serialized UserRecord
const USERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

/// Unique email index: key = lowercase email, value = user_id
const USER_EMAILS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("user_emails");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        use shared::ErrorCode;
        match err {
            StorageError::Io(ref e) if e.kind() == std::io::ErrorKind::StorageFull => {
                Self::with_message(ErrorCode::StorageFull, err.to_string())
            }
            StorageError::Storage(redb::StorageError::Corrupted(_)) => {
                Self::with_message(ErrorCode::StorageCorrupted, err.to_string())
            }
            StorageError::Storage(redb::StorageError::Io(_)) | StorageError::Io(_) => {
                Self::with_message(ErrorCode::SystemBusy, err.to_string())
            }
            _ => Self::database(err.to_string()),
        }
    }
}

/// Row counts per table (health endpoint)
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageStats {
    pub restaurants: u64,
    pub seats: u64,
    pub reservations: u64,
    pub users: u64,
}

/// Booking storage backed by redb
#[derive(Clone)]
pub struct BookingStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for BookingStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingStorage").finish_non_exhaustive()
    }
}

impl BookingStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits are durable once `commit()` returns (copy-on-write with
    /// atomic root swap), so the file is always in a consistent state.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (tests and ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(RESTAURANTS_TABLE)?;
            let _ = write_txn.open_table(RESTAURANT_OWNERS_TABLE)?;
            let _ = write_txn.open_table(SEATS_TABLE)?;
            let _ = write_txn.open_table(RESERVATIONS_TABLE)?;
            let _ = write_txn.open_multimap_table(SLOT_INDEX)?;
            let _ = write_txn.open_multimap_table(CUSTOMER_INDEX)?;
            let _ = write_txn.open_multimap_table(RESTAURANT_INDEX)?;
            let _ = write_txn.open_table(INTENT_INDEX)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(USER_EMAILS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Row counts for the main tables
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;
        Ok(StorageStats {
            restaurants: read_txn.open_table(RESTAURANTS_TABLE)?.len()?,
            seats: read_txn.open_table(SEATS_TABLE)?.len()?,
            reservations: read_txn.open_table(RESERVATIONS_TABLE)?.len()?,
            users: read_txn.open_table(USERS_TABLE)?.len()?,
        })
    }
}
