use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::errors::StoreError;
use super::KeyValueStore;
use crate::rate_limit::WindowPolicy;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local keyed store.
///
/// Entries expire lazily on access (and through [`purge_expired`]). Every
/// operation holds the shard lock of its key for its whole duration, which
/// gives the same per-key atomicity Redis gives. Revocations written here
/// are only visible to this process, so this backend suits single-node
/// development and tests.
///
/// [`purge_expired`]: InMemoryStore::purge_expired
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, Entry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry.
    ///
    /// # Returns
    /// Number of entries removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.is_expired(Instant::now()));
        }
        None
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.live_value(key))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.live_value(key).is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr_with_expiry(
        &self,
        key: &str,
        window: Duration,
        policy: WindowPolicy,
    ) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expires_at: None,
        });

        if entry.is_expired(now) {
            entry.value = "0".to_string();
            entry.expires_at = None;
        }

        let count = entry
            .value
            .parse::<u64>()
            .map_err(|_| StoreError::Corrupt(format!("{} is not a counter", key)))?
            + 1;
        entry.value = count.to_string();

        match policy {
            WindowPolicy::RefreshOnHit => entry.expires_at = Some(now + window),
            WindowPolicy::FixedFromFirstHit => {
                if entry.expires_at.is_none() {
                    entry.expires_at = Some(now + window);
                }
            }
        }

        Ok(count)
    }
}
