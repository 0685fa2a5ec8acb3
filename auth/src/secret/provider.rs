use std::fmt;
use std::str::FromStr;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;

use super::errors::SecretError;

/// Minimum accepted length of an HMAC signing secret (256 bits for HS256).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Documentation and sample values that must never sign production tokens.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "secret",
    "changeme",
    "change-me",
    "your-secret-key",
    "your-256-bit-secret",
    "my_secret_key_at_least_32_bytes_long!",
    "dev-only-signing-secret-change-me-in-production",
];

/// Deployment mode the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Test,
    Production,
}

impl RunMode {
    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }
}

impl FromStr for RunMode {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to development.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => RunMode::Production,
            "test" => RunMode::Test,
            _ => RunMode::Development,
        })
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Development => "development",
            RunMode::Test => "test",
            RunMode::Production => "production",
        };
        f.write_str(name)
    }
}

/// HMAC key material used to sign and verify tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wrap raw bytes after checking the minimum length.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than `MIN_SECRET_LENGTH` bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_SECRET_LENGTH {
            return Err(SecretError::TooShort {
                min: MIN_SECRET_LENGTH,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    fn generate() -> Self {
        let mut bytes = vec![0u8; MIN_SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.0.len())
    }
}

/// Resolves the token signing secret at startup.
///
/// Constructed explicitly and handed to the token issuer and validator, so
/// tests can build as many independent providers as they like.
#[derive(Debug, Clone)]
pub struct SecretProvider {
    configured: Option<String>,
    mode: RunMode,
}

impl SecretProvider {
    /// Create a provider from an optional configured secret.
    ///
    /// Empty or whitespace-only values are treated as absent.
    pub fn new(configured: Option<String>, mode: RunMode) -> Self {
        let configured = configured.filter(|s| !s.trim().is_empty());
        Self { configured, mode }
    }

    /// Resolve the signing secret.
    ///
    /// # Returns
    /// The configured secret, or outside production a freshly generated
    /// random secret that lives only as long as this process.
    ///
    /// # Errors
    /// * `TooShort` - Configured secret shorter than 32 bytes
    /// * `Placeholder` - Production configured with a documented sample secret
    /// * `MissingInProduction` - Nothing configured while running in production
    pub fn signing_secret(&self) -> Result<SigningSecret, SecretError> {
        match (&self.configured, self.mode) {
            (Some(secret), mode) => {
                if mode.is_production() {
                    validate_secret_strength(secret.as_bytes())?;
                }
                SigningSecret::new(secret.as_bytes())
            }
            (None, RunMode::Production) => Err(SecretError::MissingInProduction),
            (None, mode) => {
                tracing::warn!(
                    run_mode = %mode,
                    "No signing secret configured; generated an ephemeral secret. \
                     Tokens will not survive a restart. Never run production like this."
                );
                Ok(SigningSecret::generate())
            }
        }
    }
}

/// Reject secrets that are too short or copied from documentation.
///
/// # Errors
/// * `Placeholder` - Secret matches a known sample value (case-insensitive)
/// * `TooShort` - Secret shorter than `MIN_SECRET_LENGTH`
pub fn validate_secret_strength(secret: &[u8]) -> Result<(), SecretError> {
    let is_placeholder = std::str::from_utf8(secret)
        .map(|s| {
            let s = s.trim();
            PLACEHOLDER_SECRETS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false);

    if is_placeholder {
        return Err(SecretError::Placeholder);
    }

    if secret.len() < MIN_SECRET_LENGTH {
        return Err(SecretError::TooShort {
            min: MIN_SECRET_LENGTH,
            actual: secret.len(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "f3a9c1e07b5d4a2e9c8b7a6f5e4d3c2b1a0f9e8d";

    #[test]
    fn test_configured_secret_is_used() {
        let provider = SecretProvider::new(Some(STRONG.to_string()), RunMode::Production);
        let secret = provider.signing_secret().expect("strong secret accepted");
        assert_eq!(secret.as_bytes(), STRONG.as_bytes());
    }

    #[test]
    fn test_short_secret_rejected_in_every_mode() {
        for mode in [RunMode::Development, RunMode::Test, RunMode::Production] {
            let provider = SecretProvider::new(Some("too-short".to_string()), mode);
            assert_eq!(
                provider.signing_secret(),
                Err(SecretError::TooShort { min: 32, actual: 9 })
            );
        }
    }

    #[test]
    fn test_missing_secret_fatal_in_production() {
        let provider = SecretProvider::new(None, RunMode::Production);
        assert_eq!(
            provider.signing_secret(),
            Err(SecretError::MissingInProduction)
        );
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let provider = SecretProvider::new(Some("   ".to_string()), RunMode::Production);
        assert_eq!(
            provider.signing_secret(),
            Err(SecretError::MissingInProduction)
        );
    }

    #[test]
    fn test_missing_secret_generated_in_development() {
        let provider = SecretProvider::new(None, RunMode::Development);
        let first = provider.signing_secret().expect("generated secret");
        let second = provider.signing_secret().expect("generated secret");

        assert_eq!(first.as_bytes().len(), MIN_SECRET_LENGTH);
        assert_ne!(first, second);
    }

    #[test]
    fn test_placeholder_rejected_by_strength_check() {
        assert_eq!(
            validate_secret_strength(b"dev-only-signing-secret-change-me-in-production"),
            Err(SecretError::Placeholder)
        );
        assert_eq!(
            validate_secret_strength(b"Your-256-Bit-Secret"),
            Err(SecretError::Placeholder)
        );
        assert!(validate_secret_strength(STRONG.as_bytes()).is_ok());
    }

    #[test]
    fn test_placeholder_rejected_in_production_only() {
        let placeholder = "dev-only-signing-secret-change-me-in-production".to_string();

        let dev = SecretProvider::new(Some(placeholder.clone()), RunMode::Development);
        assert!(dev.signing_secret().is_ok());

        let prod = SecretProvider::new(Some(placeholder), RunMode::Production);
        assert_eq!(prod.signing_secret(), Err(SecretError::Placeholder));
    }

    #[test]
    fn test_run_mode_parsing() {
        assert_eq!("production".parse::<RunMode>(), Ok(RunMode::Production));
        assert_eq!("PROD".parse::<RunMode>(), Ok(RunMode::Production));
        assert_eq!("test".parse::<RunMode>(), Ok(RunMode::Test));
        assert_eq!("staging".parse::<RunMode>(), Ok(RunMode::Development));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let secret = SigningSecret::new(STRONG.as_bytes()).unwrap();
        let debug = format!("{:?}", secret);
        assert!(!debug.contains(STRONG));
        assert!(debug.contains("REDACTED"));
    }
}
