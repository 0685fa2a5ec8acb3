use jsonwebtoken::Algorithm;

pub mod claims;
pub mod errors;
pub mod issuer;
pub mod validator;

pub use claims::Claims;
pub use errors::TokenError;
pub use issuer::IssuedToken;
pub use issuer::TokenIssuer;
pub use validator::TokenValidator;

/// The only algorithm tokens are signed with or accepted under.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Fixed lifetime of every issued token.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;
