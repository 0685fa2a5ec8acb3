use chrono::DateTime;
use chrono::Duration;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by every bearer token.
///
/// Tokens are never mutated after issuance: they end either when `exp`
/// passes or when `jti` lands on the revocation list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Display name (username) at issuance time
    pub name: String,

    /// Token id, unique per issuance; used as the revocation key
    pub jti: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user issued at `now`.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `display_name` - Username shown to other services
    /// * `now` - Issuance instant
    /// * `lifetime` - Time until the token expires
    pub fn for_user(
        user_id: impl ToString,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let sub = user_id.to_string();
        let jti = token_id(&sub, now);

        Self {
            sub,
            name: display_name.into(),
            jti,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// `{subject}_{issued_at_micros}_{random}`.
///
/// The random suffix keeps ids distinct when the same subject is issued
/// several tokens within one clock tick.
fn token_id(subject: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        subject,
        now.timestamp_micros(),
        Uuid::new_v4().simple()
    )
}
