//! User accounts

use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use shared::models::{UserInfo, UserRole};

use super::{BookingStorage, StorageResult, USER_EMAILS_TABLE, USERS_TABLE};

/// Stored account row (with password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    /// Normalized to lowercase
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub hash_pass: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRecord {
    pub fn to_info(&self, permissions: Vec<String>) -> UserInfo {
        UserInfo {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            permissions,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl BookingStorage {
    /// Insert or overwrite a user and its email index entry
    pub fn put_user(&self, txn: &WriteTransaction, user: &UserRecord) -> StorageResult<()> {
        let value = serde_json::to_vec(user)?;
        let mut users = txn.open_table(USERS_TABLE)?;
        users.insert(user.id, value.as_slice())?;
        let mut emails = txn.open_table(USER_EMAILS_TABLE)?;
        emails.insert(user.email.as_str(), user.id)?;
        Ok(())
    }

    pub fn get_user(&self, id: i64) -> StorageResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Lookup by lowercase email
    pub fn find_user_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS_TABLE)?;
        let Some(id) = emails.get(email)?.map(|g| g.value()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS_TABLE)?;
        match users.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Email taken, checked inside the registering transaction
    pub fn email_exists_txn(&self, txn: &WriteTransaction, email: &str) -> StorageResult<bool> {
        let emails = txn.open_table(USER_EMAILS_TABLE)?;
        Ok(emails.get(email)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, email: &str) -> UserRecord {
        UserRecord {
            id,
            email: email.to_string(),
            name: "Hanako".to_string(),
            role: UserRole::Customer,
            hash_pass: "hash".to_string(),
            is_active: true,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn test_put_and_find_by_email() {
        let storage = BookingStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_user(&txn, &user(10, "hanako@example.com")).unwrap();
        assert!(storage.email_exists_txn(&txn, "hanako@example.com").unwrap());
        txn.commit().unwrap();

        let found = storage.find_user_by_email("hanako@example.com").unwrap().unwrap();
        assert_eq!(found.id, 10);
        assert!(storage.find_user_by_email("nobody@example.com").unwrap().is_none());
        assert_eq!(storage.get_user(10).unwrap().unwrap().name, "Hanako");
    }

    #[test]
    fn test_uncommitted_user_is_discarded() {
        let storage = BookingStorage::open_in_memory().unwrap();
        {
            let txn = storage.begin_write().unwrap();
            storage.put_user(&txn, &user(11, "drop@example.com")).unwrap();
        }
        assert!(storage.get_user(11).unwrap().is_none());
    }
}
