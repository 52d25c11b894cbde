//! Restaurant directory rows

use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use shared::models::Restaurant;

use super::{BookingStorage, RESTAURANT_OWNERS_TABLE, RESTAURANTS_TABLE, StorageResult};

impl BookingStorage {
    /// Insert or overwrite a restaurant and its owner index entry
    pub fn put_restaurant(
        &self,
        txn: &WriteTransaction,
        restaurant: &Restaurant,
    ) -> StorageResult<()> {
        let value = serde_json::to_vec(restaurant)?;
        let mut table = txn.open_table(RESTAURANTS_TABLE)?;
        table.insert(restaurant.id, value.as_slice())?;
        let mut owners = txn.open_table(RESTAURANT_OWNERS_TABLE)?;
        owners.insert(restaurant.owner_id, restaurant.id)?;
        Ok(())
    }

    pub fn get_restaurant(&self, id: i64) -> StorageResult<Option<Restaurant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESTAURANTS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Read inside a write transaction (sees uncommitted writes of `txn`)
    pub fn get_restaurant_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<Restaurant>> {
        let table = txn.open_table(RESTAURANTS_TABLE)?;
        let value = match table.get(id)? {
            Some(guard) => Some(serde_json::from_slice(guard.value())?),
            None => None,
        };
        Ok(value)
    }

    /// Restaurant id owned by a store account
    pub fn restaurant_id_for_owner(&self, owner_id: i64) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let owners = read_txn.open_table(RESTAURANT_OWNERS_TABLE)?;
        Ok(owners.get(owner_id)?.map(|g| g.value()))
    }

    pub fn owner_has_restaurant_txn(
        &self,
        txn: &WriteTransaction,
        owner_id: i64,
    ) -> StorageResult<bool> {
        let owners = txn.open_table(RESTAURANT_OWNERS_TABLE)?;
        Ok(owners.get(owner_id)?.is_some())
    }

    /// All restaurants in id (creation) order
    pub fn list_restaurants(&self) -> StorageResult<Vec<Restaurant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESTAURANTS_TABLE)?;
        let mut restaurants = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            restaurants.push(serde_json::from_slice(value.value())?);
        }
        Ok(restaurants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ClosingDays, RestaurantStatus};

    fn restaurant(id: i64, owner_id: i64) -> Restaurant {
        Restaurant {
            id,
            owner_id,
            name: format!("Sushi {}", id),
            description: None,
            genre: "sushi".into(),
            area: "Ginza".into(),
            address: "Tokyo".into(),
            phone: "03-0000-0000".into(),
            email: "shop@example.com".into(),
            opening_hours: "11:00-22:00".parse().unwrap(),
            closing_days: ClosingDays::default(),
            image_url: None,
            status: RestaurantStatus::Active,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_put_get_and_owner_index() {
        let storage = BookingStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_restaurant(&txn, &restaurant(1, 100)).unwrap();
        storage.put_restaurant(&txn, &restaurant(2, 200)).unwrap();
        assert!(storage.owner_has_restaurant_txn(&txn, 100).unwrap());
        assert!(storage.get_restaurant_txn(&txn, 2).unwrap().is_some());
        txn.commit().unwrap();

        assert_eq!(storage.get_restaurant(1).unwrap().unwrap().owner_id, 100);
        assert_eq!(storage.restaurant_id_for_owner(200).unwrap(), Some(2));
        assert_eq!(storage.restaurant_id_for_owner(300).unwrap(), None);

        let all = storage.list_restaurants().unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
