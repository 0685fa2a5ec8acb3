use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::IssuedToken;
use crate::jwt::TokenError;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenValidator;
use crate::revocation::RevocationStore;
use crate::secret::SigningSecret;
use crate::session::SessionCache;
use crate::session::SessionPayload;
use crate::session::SESSION_TTL;
use crate::store::KeyValueStore;
use crate::store::StoreError;

/// Identity of the caller behind an authenticated request.
///
/// Built once by [`AuthGateway::authenticate`] and handed to downstream
/// handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    pub subject: String,
    pub display_name: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl RequestIdentity {
    /// How long the token keeps passing validation after `now`.
    ///
    /// `exp` has one-second resolution and the token is accepted through the
    /// whole of that second, so the window runs to `expires_at + 1s`. Zero
    /// once the token can no longer validate.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at + chrono::Duration::seconds(1) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl From<Claims> for RequestIdentity {
    fn from(claims: Claims) -> Self {
        let expires_at = claims.expires_at();
        Self {
            subject: claims.sub,
            display_name: claims.name,
            token_id: claims.jti,
            expires_at,
        }
    }
}

/// Why a request was not authenticated, or why a session operation failed.
///
/// Callers should not reveal the specific variant to clients.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing or unreadable bearer credentials")]
    MissingCredentials,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token is expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Revocation store unavailable: {0}")]
    RevocationStoreUnavailable(StoreError),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(TokenError),
}

impl AuthError {
    /// True when the failure comes from infrastructure rather than from the
    /// presented credentials.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AuthError::RevocationStoreUnavailable(_) | AuthError::TokenIssuance(_)
        )
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed(reason) => AuthError::Malformed(reason),
            TokenError::SignatureInvalid => AuthError::SignatureInvalid,
            TokenError::Expired => AuthError::Expired,
            TokenError::SigningFailed(_) => AuthError::TokenIssuance(e),
        }
    }
}

/// Coordinates token issuance, validation, revocation and session caching.
///
/// Request path: extract bearer → validate → check revocation → identity.
/// Session path: `login` issues a token and caches the session; `logout`
/// revokes the token and clears the session.
pub struct AuthGateway {
    issuer: TokenIssuer,
    validator: TokenValidator,
    revocations: RevocationStore,
    sessions: SessionCache,
}

impl AuthGateway {
    /// Create a gateway over a shared keyed store.
    ///
    /// # Arguments
    /// * `secret` - Signing secret resolved by the `SecretProvider`
    /// * `store` - Backing store for revocations and sessions
    pub fn new(secret: &SigningSecret, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            issuer: TokenIssuer::new(secret),
            validator: TokenValidator::new(secret),
            revocations: RevocationStore::new(Arc::clone(&store)),
            sessions: SessionCache::new(store),
        }
    }

    /// Authenticate a request from its `Authorization` header value.
    ///
    /// # Arguments
    /// * `authorization` - Raw header value, `None` if absent or not text
    ///
    /// # Returns
    /// The caller's identity
    ///
    /// # Errors
    /// * `MissingCredentials` - No header, or not `Bearer <token>`
    /// * `Malformed` / `SignatureInvalid` / `Expired` - Token rejected
    /// * `Revoked` - Token was logged out
    /// * `RevocationStoreUnavailable` - Revocation status unknown; the
    ///   request must be rejected
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<RequestIdentity, AuthError> {
        let token = extract_bearer(authorization)?;
        let claims = self.validator.validate(token)?;

        match self.revocations.is_revoked(&claims.jti).await {
            Ok(false) => Ok(claims.into()),
            Ok(true) => Err(AuthError::Revoked),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    token_id = %claims.jti,
                    "Revocation check failed; rejecting request"
                );
                Err(AuthError::RevocationStoreUnavailable(e))
            }
        }
    }

    /// Start a session for a user who has just registered or logged in.
    ///
    /// The session cache write is best effort: a failure is logged and the
    /// token is still returned.
    ///
    /// # Errors
    /// * `TokenIssuance` - Token signing failed
    pub async fn login(
        &self,
        subject: &str,
        display_name: &str,
    ) -> Result<IssuedToken, AuthError> {
        let issued = self.issuer.issue(subject, display_name)?;

        let session = SessionPayload {
            user_id: subject.to_string(),
            username: display_name.to_string(),
            token_id: issued.claims.jti.clone(),
            logged_in_at: Utc::now(),
        };
        if let Err(e) = self.sessions.set(subject, &session, SESSION_TTL).await {
            tracing::warn!(
                user_id = %subject,
                error = %e,
                "Failed to cache session; continuing without it"
            );
        }

        tracing::info!(user_id = %subject, token_id = %issued.claims.jti, "Session started");
        Ok(issued)
    }

    /// End the session behind `identity`.
    ///
    /// The token is revoked for its remaining lifetime before anything else
    /// happens; only then is the session cache cleared (best effort).
    ///
    /// # Errors
    /// * `RevocationStoreUnavailable` - The token could not be durably
    ///   revoked; logout must not be reported as successful
    pub async fn logout(&self, identity: &RequestIdentity) -> Result<(), AuthError> {
        let remaining = identity.remaining_lifetime(Utc::now());

        self.revocations
            .add(&identity.token_id, remaining)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %identity.subject,
                    token_id = %identity.token_id,
                    error = %e,
                    "Failed to revoke token"
                );
                AuthError::RevocationStoreUnavailable(e)
            })?;

        if let Err(e) = self.sessions.delete(&identity.subject).await {
            tracing::warn!(
                user_id = %identity.subject,
                error = %e,
                "Failed to clear cached session"
            );
        }

        tracing::info!(user_id = %identity.subject, token_id = %identity.token_id, "Session ended");
        Ok(())
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
///
/// # Errors
/// * `MissingCredentials` - Header absent, wrong scheme, or empty token
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingCredentials)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MissingCredentials)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}
