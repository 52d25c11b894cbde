//! Seat registry rows, keyed by (restaurant_id, seat_id)

use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use shared::models::Seat;

use super::{BookingStorage, SEATS_TABLE, StorageResult};

impl BookingStorage {
    pub fn put_seat(&self, txn: &WriteTransaction, seat: &Seat) -> StorageResult<()> {
        let value = serde_json::to_vec(seat)?;
        let mut table = txn.open_table(SEATS_TABLE)?;
        table.insert((seat.restaurant_id, seat.id), value.as_slice())?;
        Ok(())
    }

    pub fn get_seat(&self, restaurant_id: i64, seat_id: i64) -> StorageResult<Option<Seat>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEATS_TABLE)?;
        match table.get((restaurant_id, seat_id))? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Returns false if the seat did not exist
    pub fn delete_seat(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
        seat_id: i64,
    ) -> StorageResult<bool> {
        let mut table = txn.open_table(SEATS_TABLE)?;
        let removed = table.remove((restaurant_id, seat_id))?.is_some();
        Ok(removed)
    }

    /// Seats of one restaurant, in seat id order
    pub fn list_seats(&self, restaurant_id: i64) -> StorageResult<Vec<Seat>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEATS_TABLE)?;
        let mut seats = Vec::new();
        for result in table.range((restaurant_id, i64::MIN)..=(restaurant_id, i64::MAX))? {
            let (_key, value) = result?;
            seats.push(serde_json::from_slice(value.value())?);
        }
        Ok(seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(restaurant_id: i64, id: i64, capacity: u32) -> Seat {
        Seat {
            id,
            restaurant_id,
            name: format!("T{}", id),
            capacity,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_list_is_scoped_to_restaurant() {
        let storage = BookingStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_seat(&txn, &seat(1, 10, 4)).unwrap();
        storage.put_seat(&txn, &seat(1, 11, 2)).unwrap();
        storage.put_seat(&txn, &seat(2, 12, 6)).unwrap();
        txn.commit().unwrap();

        let seats = storage.list_seats(1).unwrap();
        assert_eq!(seats.len(), 2);
        assert_eq!(seats.iter().map(|s| s.capacity).sum::<u32>(), 6);
        assert_eq!(storage.list_seats(2).unwrap().len(), 1);
        assert!(storage.list_seats(3).unwrap().is_empty());
    }

    #[test]
    fn test_delete_seat() {
        let storage = BookingStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_seat(&txn, &seat(1, 10, 4)).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        assert!(storage.delete_seat(&txn, 1, 10).unwrap());
        assert!(!storage.delete_seat(&txn, 1, 99).unwrap());
        txn.commit().unwrap();
        assert!(storage.get_seat(1, 10).unwrap().is_none());
    }
}
