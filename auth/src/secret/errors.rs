use thiserror::Error;

/// Error type for signing secret resolution.
///
/// All variants are fatal at process startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Signing secret too short: minimum {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Signing secret is a well-known placeholder value")]
    Placeholder,

    #[error("No signing secret configured (required in production)")]
    MissingInProduction,
}
