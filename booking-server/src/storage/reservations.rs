//! Reservation rows and their secondary indexes
//!
//! Rows are never deleted. Status and payment changes overwrite the row in
//! place; the slot / customer / restaurant indexes are written once on insert.

use redb::{
    ReadableDatabase, ReadableMultimapTable, ReadableTable, ReadableTableMetadata,
    WriteTransaction,
};
use shared::models::{Reservation, TimeslotKey};

use super::{
    BookingStorage, CUSTOMER_INDEX, INTENT_INDEX, RESERVATIONS_TABLE, RESTAURANT_INDEX,
    SLOT_INDEX, StorageResult,
};

fn load_all<T>(table: &T, ids: Vec<i64>) -> StorageResult<Vec<Reservation>>
where
    T: ReadableTable<i64, &'static [u8]>,
{
    let mut reservations = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(guard) = table.get(id)? {
            reservations.push(serde_json::from_slice(guard.value())?);
        }
    }
    Ok(reservations)
}

impl BookingStorage {
    /// Insert a new reservation with all index entries
    ///
    /// Returns `false` (and writes nothing) if the id already exists.
    pub fn insert_reservation(
        &self,
        txn: &WriteTransaction,
        reservation: &Reservation,
    ) -> StorageResult<bool> {
        let value = serde_json::to_vec(reservation)?;
        let slot_id = reservation.timeslot().slot_id();

        let mut table = txn.open_table(RESERVATIONS_TABLE)?;
        if table.get(reservation.id)?.is_some() {
            return Ok(false);
        }
        table.insert(reservation.id, value.as_slice())?;

        let mut by_slot = txn.open_multimap_table(SLOT_INDEX)?;
        by_slot.insert((reservation.restaurant_id, slot_id.as_str()), reservation.id)?;
        let mut by_customer = txn.open_multimap_table(CUSTOMER_INDEX)?;
        by_customer.insert(reservation.customer_id, reservation.id)?;
        let mut by_restaurant = txn.open_multimap_table(RESTAURANT_INDEX)?;
        by_restaurant.insert(reservation.restaurant_id, reservation.id)?;

        if let Some(intent) = &reservation.payment_intent_id {
            let mut by_intent = txn.open_table(INTENT_INDEX)?;
            by_intent.insert(intent.as_str(), reservation.id)?;
        }
        Ok(true)
    }

    /// Overwrite an existing row (status / payment changes)
    ///
    /// A replaced payment intent is dropped from the intent index.
    pub fn update_reservation(
        &self,
        txn: &WriteTransaction,
        reservation: &Reservation,
    ) -> StorageResult<()> {
        let value = serde_json::to_vec(reservation)?;
        let mut table = txn.open_table(RESERVATIONS_TABLE)?;
        let previous_intent = match table.get(reservation.id)? {
            Some(guard) => serde_json::from_slice::<Reservation>(guard.value())?.payment_intent_id,
            None => None,
        };
        table.insert(reservation.id, value.as_slice())?;

        if previous_intent == reservation.payment_intent_id {
            return Ok(());
        }
        let mut by_intent = txn.open_table(INTENT_INDEX)?;
        if let Some(old) = &previous_intent {
            let owned_here = by_intent.get(old.as_str())?.map(|g| g.value()) == Some(reservation.id);
            if owned_here {
                by_intent.remove(old.as_str())?;
            }
        }
        if let Some(intent) = &reservation.payment_intent_id {
            by_intent.insert(intent.as_str(), reservation.id)?;
        }
        Ok(())
    }

    pub fn get_reservation(&self, id: i64) -> StorageResult<Option<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_reservation_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<Reservation>> {
        let table = txn.open_table(RESERVATIONS_TABLE)?;
        let value = match table.get(id)? {
            Some(guard) => Some(serde_json::from_slice(guard.value())?),
            None => None,
        };
        Ok(value)
    }

    pub fn reservation_id_for_intent(&self, intent_id: &str) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INTENT_INDEX)?;
        Ok(table.get(intent_id)?.map(|g| g.value()))
    }

    /// Every reservation (any status) booked into one timeslot
    pub fn reservations_in_slot(&self, key: &TimeslotKey) -> StorageResult<Vec<Reservation>> {
        let slot_id = key.slot_id();
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(SLOT_INDEX)?;
        let mut ids = Vec::new();
        for id in index.get((key.restaurant_id, slot_id.as_str()))? {
            ids.push(id?.value());
        }
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        load_all(&table, ids)
    }

    pub fn reservations_for_customer(&self, customer_id: i64) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(CUSTOMER_INDEX)?;
        let mut ids = Vec::new();
        for id in index.get(customer_id)? {
            ids.push(id?.value());
        }
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        load_all(&table, ids)
    }

    pub fn reservations_for_restaurant(
        &self,
        restaurant_id: i64,
    ) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_multimap_table(RESTAURANT_INDEX)?;
        let mut ids = Vec::new();
        for id in index.get(restaurant_id)? {
            ids.push(id?.value());
        }
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        load_all(&table, ids)
    }

    /// Full scan (platform-wide sales)
    pub fn all_reservations(&self) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        let mut reservations = Vec::with_capacity(table.len()? as usize);
        for result in table.iter()? {
            let (_key, value) = result?;
            reservations.push(serde_json::from_slice(value.value())?);
        }
        Ok(reservations)
    }
}
