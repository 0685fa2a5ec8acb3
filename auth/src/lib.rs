//! Token authentication and session revocation.
//!
//! Provides the authentication core shared by the network's services:
//! - Signing secret resolution (`SecretProvider`)
//! - Bearer token issuance and validation (HS256 JWT, fixed 24h lifetime)
//! - Server-side revocation list for logout (fail-closed)
//! - Best-effort session cache
//! - Fixed-window rate limiting over arbitrary keys
//! - Request authentication and session lifecycle (`AuthGateway`)
//!
//! Revocations, sessions and rate-limit counters live in a shared keyed
//! store (`RedisStore` in deployments, `InMemoryStore` for a single node).
//!
//! # Examples
//!
//! ## Tokens
//! ```
//! use auth::{RunMode, SecretProvider, TokenIssuer, TokenValidator};
//!
//! let provider = SecretProvider::new(
//!     Some("doc-example-secret-0123456789abcdef0123".to_string()),
//!     RunMode::Production,
//! );
//! let secret = provider.signing_secret().unwrap();
//!
//! let issued = TokenIssuer::new(&secret).issue("user123", "alice").unwrap();
//! let claims = TokenValidator::new(&secret).validate(&issued.token).unwrap();
//! assert_eq!(claims.name, "alice");
//! ```
//!
//! ## Login, authenticated request, logout
//! ```
//! use std::sync::Arc;
//!
//! use auth::{AuthError, AuthGateway, InMemoryStore, RunMode, SecretProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let secret = SecretProvider::new(None, RunMode::Development)
//!     .signing_secret()
//!     .unwrap();
//! let gateway = AuthGateway::new(&secret, Arc::new(InMemoryStore::new()));
//!
//! let issued = gateway.login("user123", "alice").await.unwrap();
//! let header = format!("Bearer {}", issued.token);
//!
//! let identity = gateway.authenticate(Some(&header)).await.unwrap();
//! assert_eq!(identity.display_name, "alice");
//!
//! gateway.logout(&identity).await.unwrap();
//! assert_eq!(
//!     gateway.authenticate(Some(&header)).await,
//!     Err(AuthError::Revoked)
//! );
//! # }
//! ```

pub mod gateway;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod revocation;
pub mod secret;
pub mod session;
pub mod store;

// Re-export commonly used items
pub use gateway::extract_bearer;
pub use gateway::AuthError;
pub use gateway::AuthGateway;
pub use gateway::RequestIdentity;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::TokenError;
pub use jwt::TokenIssuer;
pub use jwt::TokenValidator;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use rate_limit::RateLimiter;
pub use rate_limit::WindowPolicy;
pub use revocation::RevocationStore;
pub use secret::validate_secret_strength;
pub use secret::RunMode;
pub use secret::SecretError;
pub use secret::SecretProvider;
pub use secret::SigningSecret;
pub use session::SessionCache;
pub use session::SessionPayload;
pub use store::InMemoryStore;
pub use store::KeyValueStore;
pub use store::RedisStore;
pub use store::RedisStoreConfig;
pub use store::StoreError;
