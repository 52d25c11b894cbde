//! Restaurant Directory
//!
//! Restaurant profiles: owner, opening hours, closing days and approval
//! status. A store account owns at most one restaurant. New restaurants start
//! `pending` and only accept bookings once an admin approves them.

use std::sync::Arc;

use shared::models::{
    Restaurant, RestaurantCreate, RestaurantFilter, RestaurantStatus, RestaurantUpdate,
};

use crate::booking::{BookingError, BookingResult, LockTable};
use crate::storage::{BookingStorage, StorageError};
use crate::utils::{BusinessClock, PaginationParams};

#[derive(Debug, Clone)]
pub struct RestaurantDirectory {
    storage: BookingStorage,
    locks: Arc<LockTable<i64>>,
    clock: BusinessClock,
}

fn matches_text(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => value.to_lowercase().contains(&wanted.to_lowercase()),
    }
}

impl RestaurantDirectory {
    pub fn new(storage: BookingStorage, locks: Arc<LockTable<i64>>, clock: BusinessClock) -> Self {
        Self {
            storage,
            locks,
            clock,
        }
    }

    /// Register the owner's restaurant (status `pending`)
    pub fn create(&self, owner_id: i64, payload: RestaurantCreate) -> BookingResult<Restaurant> {
        let now = self.clock.now_millis();
        let restaurant = Restaurant {
            id: shared::util::snowflake_id(),
            owner_id,
            name: payload.name.trim().to_string(),
            description: payload.description,
            genre: payload.genre.trim().to_string(),
            area: payload.area.trim().to_string(),
            address: payload.address,
            phone: payload.phone,
            email: payload.email,
            opening_hours: payload.opening_hours,
            closing_days: payload.closing_days.unwrap_or_default(),
            image_url: payload.image_url,
            status: RestaurantStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let txn = self.storage.begin_write()?;
        if self.storage.owner_has_restaurant_txn(&txn, owner_id)? {
            txn.abort().map_err(StorageError::from)?;
            return Err(BookingError::RestaurantAlreadyRegistered(owner_id));
        }
        self.storage.put_restaurant(&txn, &restaurant)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            restaurant_id = restaurant.id,
            owner_id,
            name = %restaurant.name,
            "Restaurant registered"
        );
        Ok(restaurant)
    }

    pub fn get(&self, id: i64) -> BookingResult<Restaurant> {
        self.storage
            .get_restaurant(id)?
            .ok_or(BookingError::RestaurantNotFound(id))
    }

    pub fn get_by_owner(&self, owner_id: i64) -> BookingResult<Restaurant> {
        let id = self
            .storage
            .restaurant_id_for_owner(owner_id)?
            .ok_or(BookingError::NoRestaurantForOwner(owner_id))?;
        self.get(id)
    }

    /// Public listing. Without an explicit status only `active` restaurants are returned.
    pub fn list(&self, filter: &RestaurantFilter) -> BookingResult<Vec<Restaurant>> {
        let status = filter.status.unwrap_or(RestaurantStatus::Active);
        let restaurants = self
            .storage
            .list_restaurants()?
            .into_iter()
            .filter(|r| r.status == status)
            .filter(|r| matches_text(&filter.genre, &r.genre))
            .filter(|r| matches_text(&filter.area, &r.area))
            .collect();
        Ok(PaginationParams::new(filter.skip, filter.limit).apply(restaurants))
    }

    /// Admin listing, any status unless filtered
    pub fn list_all(&self, status: Option<RestaurantStatus>) -> BookingResult<Vec<Restaurant>> {
        Ok(self
            .storage
            .list_restaurants()?
            .into_iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .collect())
    }

    /// Update profile fields. Holds the restaurant lock exclusively so no
    /// booking checks hours or closing days mid-update.
    pub async fn update(&self, id: i64, payload: RestaurantUpdate) -> BookingResult<Restaurant> {
        let _guard = self.locks.exclusive(id).await?;

        let mut restaurant = self.get(id)?;
        if let Some(name) = payload.name {
            restaurant.name = name.trim().to_string();
        }
        if let Some(description) = payload.description {
            restaurant.description = Some(description);
        }
        if let Some(genre) = payload.genre {
            restaurant.genre = genre.trim().to_string();
        }
        if let Some(area) = payload.area {
            restaurant.area = area.trim().to_string();
        }
        if let Some(address) = payload.address {
            restaurant.address = address;
        }
        if let Some(phone) = payload.phone {
            restaurant.phone = phone;
        }
        if let Some(email) = payload.email {
            restaurant.email = email;
        }
        if let Some(hours) = payload.opening_hours {
            restaurant.opening_hours = hours;
        }
        if let Some(days) = payload.closing_days {
            restaurant.closing_days = days;
        }
        if let Some(image_url) = payload.image_url {
            restaurant.image_url = Some(image_url);
        }
        restaurant.updated_at = self.clock.now_millis();

        let txn = self.storage.begin_write()?;
        self.storage.put_restaurant(&txn, &restaurant)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(restaurant_id = id, "Restaurant updated");
        Ok(restaurant)
    }

    /// Approve / suspend
    pub async fn set_status(&self, id: i64, status: RestaurantStatus) -> BookingResult<Restaurant> {
        let _guard = self.locks.exclusive(id).await?;

        let mut restaurant = self.get(id)?;
        let previous = restaurant.status;
        restaurant.status = status;
        restaurant.updated_at = self.clock.now_millis();

        let txn = self.storage.begin_write()?;
        self.storage.put_restaurant(&txn, &restaurant)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            restaurant_id = id,
            from = previous.as_str(),
            to = status.as_str(),
            "Restaurant status changed"
        );
        Ok(restaurant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn directory() -> RestaurantDirectory {
        RestaurantDirectory::new(
            BookingStorage::open_in_memory().unwrap(),
            Arc::new(LockTable::new("restaurant", Duration::from_millis(200))),
            BusinessClock::system(chrono_tz::Asia::Tokyo),
        )
    }

    fn payload(name: &str, genre: &str, area: &str) -> RestaurantCreate {
        RestaurantCreate {
            name: name.to_string(),
            description: None,
            genre: genre.to_string(),
            area: area.to_string(),
            address: "1-1 Ginza".to_string(),
            phone: "03-0000-0000".to_string(),
            email: "shop@example.com".to_string(),
            opening_hours: "11:30-14:00, 17:00-22:00".parse().unwrap(),
            closing_days: Some("日曜日".parse().unwrap()),
            image_url: None,
        }
    }

    #[test]
    fn test_create_starts_pending_and_one_per_owner() {
        let directory = directory();
        let created = directory.create(10, payload("Sushi Ko", "sushi", "Ginza")).unwrap();
        assert_eq!(created.status, RestaurantStatus::Pending);
        assert_eq!(directory.get_by_owner(10).unwrap().id, created.id);

        let err = directory
            .create(10, payload("Second", "sushi", "Ginza"))
            .unwrap_err();
        assert!(matches!(err, BookingError::RestaurantAlreadyRegistered(10)));
        assert!(matches!(
            directory.get_by_owner(11),
            Err(BookingError::NoRestaurantForOwner(11))
        ));
    }

    #[tokio::test]
    async fn test_public_listing_shows_active_only() {
        let directory = directory();
        let a = directory.create(1, payload("A", "sushi", "Ginza")).unwrap();
        let b = directory.create(2, payload("B", "ramen", "Shibuya")).unwrap();
        directory.create(3, payload("C", "sushi", "Shinjuku")).unwrap();

        assert!(directory.list(&RestaurantFilter::default()).unwrap().is_empty());

        directory.set_status(a.id, RestaurantStatus::Active).await.unwrap();
        directory.set_status(b.id, RestaurantStatus::Active).await.unwrap();

        let all = directory.list(&RestaurantFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let sushi = directory
            .list(&RestaurantFilter {
                genre: Some("SUSHI".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(sushi.len(), 1);
        assert_eq!(sushi[0].id, a.id);

        assert_eq!(directory.list_all(None).unwrap().len(), 3);
        assert_eq!(
            directory
                .list_all(Some(RestaurantStatus::Pending))
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_changes_hours() {
        let directory = directory();
        let r = directory.create(1, payload("A", "sushi", "Ginza")).unwrap();
        let updated = directory
            .update(
                r.id,
                RestaurantUpdate {
                    opening_hours: Some("18:00-02:00".parse().unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.opening_hours.windows()[0].wraps_midnight());
        assert_eq!(directory.get(r.id).unwrap().name, "A");

        assert!(matches!(
            directory.update(999, RestaurantUpdate::default()).await,
            Err(BookingError::RestaurantNotFound(999))
        ));
    }
}
