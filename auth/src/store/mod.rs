use std::time::Duration;

use async_trait::async_trait;

use crate::rate_limit::WindowPolicy;

pub mod errors;
pub mod memory;
pub mod redis_store;

pub use errors::StoreError;
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;
pub use redis_store::RedisStoreConfig;

/// Shared keyed store with per-key TTLs.
///
/// Implementations must give read-your-writes visibility: once a write
/// returns `Ok`, every later read from any caller observes it.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Store `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Fetch a live value.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Check whether a live value exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove a key; absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Increment the counter at `key` and apply `window` as its expiry in a
    /// single atomic step.
    ///
    /// # Returns
    /// The post-increment count (1 for a fresh or expired key)
    async fn incr_with_expiry(
        &self,
        key: &str,
        window: Duration,
        policy: WindowPolicy,
    ) -> Result<u64, StoreError>;
}
