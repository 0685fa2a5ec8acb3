use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::decode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::claims::Claims;
use super::errors::TokenError;
use super::SIGNING_ALGORITHM;
use crate::secret::SigningSecret;

/// Only the `alg` field matters before the signature is checked.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Parses and cryptographically verifies bearer tokens.
///
/// Revocation is not checked here; see [`crate::gateway::AuthGateway`].
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    /// Create a validator bound to a signing secret.
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token and return its claims.
    ///
    /// The header algorithm is compared against the pinned server algorithm
    /// before any key material is used, so `alg: none` or an asymmetric
    /// algorithm name can never select the verification path.
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be parsed
    /// * `SignatureInvalid` - Signature mismatch or disallowed algorithm
    /// * `Expired` - `exp` is in the past
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        match header_algorithm(token)?.parse::<Algorithm>() {
            Ok(algorithm) if algorithm == SIGNING_ALGORITHM => {}
            _ => return Err(TokenError::SignatureInvalid),
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(token_data.claims)
    }
}

fn header_algorithm(token: &str) -> Result<String, TokenError> {
    let mut segments = token.split('.');
    let header = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(header), Some(_), Some(_), None) => header,
        _ => {
            return Err(TokenError::Malformed(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| TokenError::Malformed(format!("header encoding: {}", e)))?;
    let raw: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))?;

    Ok(raw.alg)
}
