use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use deadpool_redis::PoolConfig;
use deadpool_redis::Runtime;
use redis::AsyncCommands;

use super::errors::StoreError;
use super::KeyValueStore;
use crate::rate_limit::WindowPolicy;

/// Connection settings for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g. `redis://localhost:6379`)
    pub url: String,
    pub pool_size: usize,
    /// Upper bound for a single command, including the wait for a pooled
    /// connection
    pub command_timeout: Duration,
}

/// Keyed store backed by a shared Redis instance.
///
/// Redis executes each command (and each `MULTI` block) atomically and
/// serves reads from the primary, which gives the read-your-writes
/// visibility revocation depends on.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    command_timeout: Duration,
}

impl RedisStore {
    /// Build the connection pool and verify connectivity with `PING`.
    ///
    /// # Errors
    /// * `Unavailable` - Pool could not be created or Redis did not answer
    /// * `Timeout` - Redis did not answer within the command timeout
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self, StoreError> {
        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = Some(config.command_timeout);
        pool_config.timeouts.create = Some(config.command_timeout);
        pool_config.timeouts.recycle = Some(config.command_timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Unavailable(format!("failed to create pool: {}", e)))?;

        let store = Self {
            pool,
            command_timeout: config.command_timeout,
        };

        store
            .with_timeout(async {
                let mut conn = store.pool.get().await?;
                let _: String = redis::cmd("PING").query_async(&mut conn).await?;
                Ok(())
            })
            .await?;

        tracing::info!(
            pool_size = config.pool_size,
            command_timeout_ms = config.command_timeout.as_millis() as u64,
            "Redis store connected"
        );

        Ok(store)
    }

    async fn with_timeout<F, T>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.command_timeout, op)
            .await
            .map_err(|_| StoreError::Timeout(self.command_timeout))?
    }
}

fn millis(duration: Duration) -> u64 {
    (duration.as_millis() as u64).max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.with_timeout(async {
            let mut conn = self.pool.get().await?;
            let _: () = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(millis(ttl))
                .query_async(&mut conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_timeout(async {
            let mut conn = self.pool.get().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.with_timeout(async {
            let mut conn = self.pool.get().await?;
            let exists: bool = conn.exists(key).await?;
            Ok(exists)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_timeout(async {
            let mut conn = self.pool.get().await?;
            let _: () = conn.del(key).await?;
            Ok(())
        })
        .await
    }

    async fn incr_with_expiry(
        &self,
        key: &str,
        window: Duration,
        policy: WindowPolicy,
    ) -> Result<u64, StoreError> {
        self.with_timeout(async {
            let mut conn = self.pool.get().await?;

            let mut pipe = redis::pipe();
            pipe.atomic().cmd("INCR").arg(key);
            pipe.cmd("PEXPIRE").arg(key).arg(millis(window));
            if policy == WindowPolicy::FixedFromFirstHit {
                // Redis >= 7.0: only set the expiry when the key has none.
                pipe.arg("NX");
            }
            pipe.ignore();

            let (count,): (u64,) = pipe.query_async(&mut conn).await?;
            Ok(count)
        })
        .await
    }
}
