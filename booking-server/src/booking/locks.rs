//! Keyed async lock table
//!
//! One `tokio::sync::RwLock` per key, created on first use and dropped once
//! no task holds or waits on it. Acquisition waits at most `timeout` and then
//! fails with [`BookingError::LockTimeout`].
//!
//! Used twice by the booking engine:
//! - restaurant locks (key = restaurant id): registry mutations exclusive,
//!   bookings shared
//! - timeslot locks (key = [`TimeslotKey`](shared::models::TimeslotKey)):
//!   always exclusive
//!
//! Callers always take the restaurant lock before the timeslot lock.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use super::{BookingError, BookingResult};

enum Held {
    Shared(#[allow(dead_code)] OwnedRwLockReadGuard<()>),
    Exclusive(#[allow(dead_code)] OwnedRwLockWriteGuard<()>),
}

pub struct LockTable<K>
where
    K: Eq + Hash + Clone,
{
    scope: &'static str,
    locks: DashMap<K, Arc<RwLock<()>>>,
    timeout: Duration,
}

impl<K> std::fmt::Debug for LockTable<K>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockTable")
            .field("scope", &self.scope)
            .field("entries", &self.locks.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Held lock; releasing it also evicts the table entry when unused
pub struct LockGuard<'a, K>
where
    K: Eq + Hash + Clone,
{
    table: &'a LockTable<K>,
    key: K,
    held: Option<Held>,
}

impl<K> LockGuard<'_, K>
where
    K: Eq + Hash + Clone,
{
    pub fn is_exclusive(&self) -> bool {
        matches!(self.held, Some(Held::Exclusive(_)))
    }
}

impl<K> Drop for LockGuard<'_, K>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        // release before eviction so the strong count no longer includes us
        self.held.take();
        self.table.evict(&self.key);
    }
}

impl<K> LockTable<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(scope: &'static str, timeout: Duration) -> Self {
        Self {
            scope,
            locks: DashMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of live entries (held or awaited)
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn entry(&self, key: &K) -> Arc<RwLock<()>> {
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    fn evict(&self, key: &K) {
        // the map's own reference is the only one left
        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Exclusive (write) lock with bounded wait
    pub async fn exclusive(&self, key: K) -> BookingResult<LockGuard<'_, K>> {
        let lock = self.entry(&key);
        match tokio::time::timeout(self.timeout, lock.write_owned()).await {
            Ok(guard) => Ok(LockGuard {
                table: self,
                key,
                held: Some(Held::Exclusive(guard)),
            }),
            Err(_) => {
                self.evict(&key);
                Err(BookingError::LockTimeout(self.scope))
            }
        }
    }

    /// Shared (read) lock with bounded wait
    pub async fn shared(&self, key: K) -> BookingResult<LockGuard<'_, K>> {
        let lock = self.entry(&key);
        match tokio::time::timeout(self.timeout, lock.read_owned()).await {
            Ok(guard) => Ok(LockGuard {
                table: self,
                key,
                held: Some(Held::Shared(guard)),
            }),
            Err(_) => {
                self.evict(&key);
                Err(BookingError::LockTimeout(self.scope))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(timeout_ms: u64) -> LockTable<i64> {
        LockTable::new("test", Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn test_entry_evicted_after_release() {
        let locks = table(100);
        {
            let guard = locks.exclusive(1).await.unwrap();
            assert!(guard.is_exclusive());
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_shared_holders_coexist() {
        let locks = table(100);
        let a = locks.shared(1).await.unwrap();
        let b = locks.shared(1).await.unwrap();
        assert!(!a.is_exclusive());
        drop(a);
        assert_eq!(locks.len(), 1);
        drop(b);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_exclusive_times_out_while_held() {
        let locks = table(50);
        let _held = locks.shared(7).await.unwrap();

        let err = locks.exclusive(7).await.err().unwrap();
        assert!(matches!(err, BookingError::LockTimeout("test")));
        // the holder keeps the entry alive
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = table(50);
        let _a = locks.exclusive(1).await.unwrap();
        let _b = locks.exclusive(2).await.unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_waiter_acquires_after_release() {
        let locks = Arc::new(table(1000));
        let guard = locks.exclusive(3).await.unwrap();

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let g = locks.exclusive(3).await;
                g.is_ok()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);

        assert!(waiter.await.unwrap());
        assert!(locks.is_empty());
    }
}
