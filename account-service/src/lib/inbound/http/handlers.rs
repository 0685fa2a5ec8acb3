use std::net::SocketAddr;

use auth::AuthError;
use axum::extract::ConnectInfo;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::User;
use crate::inbound::http::router::AppState;

pub mod login;
pub mod logout;
pub mod me;
pub mod register;

const UNAUTHORIZED: &str = "Unauthorized";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    TooManyRequests(String),
    ServiceUnavailable(String),
}

impl ApiError {
    /// Authentication failure with no hint about the cause.
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(UNAUTHORIZED.to_string())
    }

    pub fn internal() -> Self {
        ApiError::InternalServerError(INTERNAL_ERROR.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        tracing::error!(error = %e, "Unhandled error");
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::UsernameAlreadyExists(_) | AccountError::EmailAlreadyExists(_) => {
                ApiError::Conflict(err.to_string())
            }
            AccountError::InvalidCredentials => ApiError::unauthorized(),
            AccountError::InvalidUsername(_)
            | AccountError::InvalidEmail(_)
            | AccountError::InvalidPassword(_)
            | AccountError::InvalidUserId(_) => ApiError::UnprocessableEntity(err.to_string()),
            AccountError::Hashing(_) | AccountError::DatabaseError(_) | AccountError::Unknown(_) => {
                tracing::error!(error = %err, "Account operation failed");
                ApiError::internal()
            }
        }
    }
}

/// Clients only ever see 401 or 500; the reason goes to the log.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_unavailable() {
            tracing::error!(error = %err, "Authentication backend failure");
            ApiError::internal()
        } else {
            tracing::warn!(reason = %err, "Request authentication rejected");
            ApiError::unauthorized()
        }
    }
}

/// Count one attempt against `{scope}:{client_ip}`.
///
/// A limiter that cannot reach its store rejects the request.
pub async fn enforce_rate_limit(
    state: &AppState,
    scope: &str,
    limit: u64,
    client: Option<ConnectInfo<SocketAddr>>,
) -> Result<(), ApiError> {
    let client_ip = client
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}:{}", scope, client_ip);

    match state.rate_limiter.allow(&key, limit, state.rate_limit_window).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::warn!(scope, client_ip = %client_ip, "Rate limit exceeded");
            Err(ApiError::TooManyRequests(
                "Too many requests, try again later".to_string(),
            ))
        }
        Err(e) => {
            tracing::error!(scope, error = %e, "Rate limiter unavailable");
            Err(ApiError::ServiceUnavailable(
                "Service temporarily unavailable".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

/// Body returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub user: UserData,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use auth::StoreError;
    use auth::TokenError;

    use super::*;

    #[test]
    fn test_auth_errors_are_generic_401() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::Malformed("bad header".to_string()),
            AuthError::SignatureInvalid,
            AuthError::Expired,
            AuthError::Revoked,
        ] {
            assert_eq!(ApiError::from(err), ApiError::unauthorized());
        }
    }

    #[test]
    fn test_store_outage_is_500() {
        let err = AuthError::RevocationStoreUnavailable(StoreError::Unavailable(
            "connection refused".to_string(),
        ));
        assert_eq!(ApiError::from(err), ApiError::internal());

        let err = AuthError::TokenIssuance(TokenError::SigningFailed("boom".to_string()));
        assert_eq!(ApiError::from(err), ApiError::internal());
    }

    #[test]
    fn test_infrastructure_errors_hide_details() {
        let err = AccountError::DatabaseError("password authentication failed".to_string());
        assert_eq!(ApiError::from(err), ApiError::internal());
        assert_eq!(
            ApiError::from(AccountError::InvalidCredentials),
            ApiError::unauthorized()
        );
    }
}
