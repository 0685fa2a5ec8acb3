use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::TokenError;
use super::SIGNING_ALGORITHM;
use super::TOKEN_LIFETIME_HOURS;
use crate::secret::SigningSecret;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS string for the `Authorization: Bearer` header
    pub token: String,
    pub claims: Claims,
}

/// Mints signed, expiring bearer tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    /// Create an issuer bound to a signing secret.
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for a user, valid for 24 hours from now.
    ///
    /// # Arguments
    /// * `subject` - User identifier
    /// * `display_name` - Username
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, subject: &str, display_name: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, display_name, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims::for_user(
            subject,
            display_name,
            now,
            Duration::hours(TOKEN_LIFETIME_HOURS),
        );
        let token = self.sign(&claims)?;

        Ok(IssuedToken { token, claims })
    }

    /// Sign arbitrary claims with the pinned algorithm.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }
}
