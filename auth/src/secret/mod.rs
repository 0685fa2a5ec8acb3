pub mod errors;
pub mod provider;

pub use errors::SecretError;
pub use provider::validate_secret_strength;
pub use provider::RunMode;
pub use provider::SecretProvider;
pub use provider::SigningSecret;
pub use provider::MIN_SECRET_LENGTH;
