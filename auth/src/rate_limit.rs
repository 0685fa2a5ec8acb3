use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::store::KeyValueStore;
use crate::store::StoreError;

/// How a counter's window expiry is maintained.
///
/// `RefreshOnHit` pushes the expiry out by a full window on every call, so a
/// caller hitting more often than once per window never sees the counter
/// reset; it behaves like a decaying-activity limiter. `FixedFromFirstHit`
/// is the textbook fixed window: the expiry is set once, when the window
/// opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    RefreshOnHit,
    FixedFromFirstHit,
}

impl FromStr for WindowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refresh_on_hit" => Ok(WindowPolicy::RefreshOnHit),
            "fixed_from_first_hit" => Ok(WindowPolicy::FixedFromFirstHit),
            other => Err(format!("unknown window policy: {}", other)),
        }
    }
}

/// Fixed-window counter keyed by an arbitrary caller-supplied string.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    policy: WindowPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, policy: WindowPolicy) -> Self {
        Self { store, policy }
    }

    /// Count one hit for `key` and decide whether it is within `limit`.
    ///
    /// # Arguments
    /// * `key` - Counter key, e.g. `login:{ip}`
    /// * `limit` - Maximum hits per window
    /// * `window` - Window length
    ///
    /// # Returns
    /// `true` iff the post-increment count is at most `limit`
    ///
    /// # Errors
    /// * `StoreError` - Counter store unreachable; callers decide whether to
    ///   fail open or closed
    pub async fn allow(&self, key: &str, limit: u64, window: Duration) -> Result<bool, StoreError> {
        let count = self
            .store
            .incr_with_expiry(key, window, self.policy)
            .await?;

        let allowed = count <= limit;
        if !allowed {
            tracing::debug!(key = %key, count, limit, "Rate limit exceeded");
        }

        Ok(allowed)
    }
}
