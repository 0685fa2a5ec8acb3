use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::store::KeyValueStore;
use crate::store::StoreError;

const KEY_PREFIX: &str = "session:";

/// Session entries live for a day and are refreshed on every login.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identity summary cached for a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub user_id: String,
    pub username: String,
    pub token_id: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Best-effort cache of per-user session payloads.
///
/// Not a source of truth: a session may outlive its token or vanish while
/// the token is still valid. Callers log errors from this cache and carry on.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store `payload` for `user_id`, replacing any previous session.
    ///
    /// # Errors
    /// * `Corrupt` - Payload could not be serialized
    /// * `StoreError` - Store unreachable
    pub async fn set<T: Serialize + Sync>(
        &self,
        user_id: &str,
        payload: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let value =
            serde_json::to_string(payload).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.store.set_ex(&key(user_id), &value, ttl).await
    }

    /// Fetch the cached session for `user_id`, if any.
    ///
    /// # Errors
    /// * `Corrupt` - Cached value does not deserialize into `T`
    /// * `StoreError` - Store unreachable
    pub async fn get<T: DeserializeOwned>(&self, user_id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(&key(user_id)).await? {
            Some(value) => serde_json::from_str(&value)
                .map(Some)
                .map_err(|e| StoreError::Corrupt(e.to_string())),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        self.store.delete(&key(user_id)).await
    }
}

fn key(user_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, user_id)
}
