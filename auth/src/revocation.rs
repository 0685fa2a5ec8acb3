use std::sync::Arc;
use std::time::Duration;

use crate::store::KeyValueStore;
use crate::store::StoreError;

const KEY_PREFIX: &str = "auth:blacklist:";
const SENTINEL: &str = "1";

/// Shared set of revoked token ids.
///
/// Failures are always surfaced: an unreachable store must never read as
/// "not revoked".
#[derive(Clone)]
pub struct RevocationStore {
    store: Arc<dyn KeyValueStore>,
}

impl RevocationStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record `token_id` as revoked for `ttl`.
    ///
    /// `ttl` should be the token's remaining lifetime; after that the token
    /// fails validation on its own and the entry can go. A zero `ttl` means
    /// the token can no longer validate and nothing is written.
    ///
    /// # Errors
    /// * `StoreError` - The revocation was not durably recorded
    pub async fn add(&self, token_id: &str, ttl: Duration) -> Result<(), StoreError> {
        if ttl.is_zero() {
            tracing::debug!(token_id = %token_id, "Token already expired; skipping revocation");
            return Ok(());
        }

        self.store.set_ex(&key(token_id), SENTINEL, ttl).await?;
        tracing::info!(
            token_id = %token_id,
            ttl_secs = ttl.as_secs(),
            "Token revoked"
        );
        Ok(())
    }

    /// Check whether `token_id` has been revoked.
    ///
    /// # Errors
    /// * `StoreError` - Membership could not be determined
    pub async fn is_revoked(&self, token_id: &str) -> Result<bool, StoreError> {
        self.store.exists(&key(token_id)).await
    }
}

fn key(token_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, token_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::UnreachableStore;
    use crate::store::InMemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_revocation_visible_until_ttl_elapses() {
        let revocations = RevocationStore::new(Arc::new(InMemoryStore::new()));
        let ttl = Duration::from_secs(3600);

        assert!(!revocations.is_revoked("jti-1").await.unwrap());

        revocations.add("jti-1", ttl).await.unwrap();
        assert!(revocations.is_revoked("jti-1").await.unwrap());
        assert!(!revocations.is_revoked("jti-2").await.unwrap());

        tokio::time::advance(ttl - Duration::from_secs(1)).await;
        assert!(revocations.is_revoked("jti-1").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!revocations.is_revoked("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_are_namespaced() {
        let store = Arc::new(InMemoryStore::new());
        let revocations = RevocationStore::new(store.clone());

        revocations
            .add("jti-1", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.exists("auth:blacklist:jti-1").await.unwrap());
        assert!(!store.exists("jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_a_no_op() {
        let store = Arc::new(InMemoryStore::new());
        let revocations = RevocationStore::new(store.clone());

        revocations.add("jti-1", Duration::ZERO).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_closed() {
        let revocations = RevocationStore::new(Arc::new(UnreachableStore));

        assert!(revocations.is_revoked("jti-1").await.is_err());
        assert!(revocations
            .add("jti-1", Duration::from_secs(60))
            .await
            .is_err());
    }
}
