use auth::RequestIdentity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::UserId;
use crate::inbound::http::router::AppState;

/// Profile of the authenticated caller.
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&identity.subject).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not an account id");
        ApiError::unauthorized()
    })?;

    let user = state
        .account_service
        .get_user(&user_id)
        .await
        .map_err(|e| match e {
            // Valid token for an account that no longer exists
            AccountError::NotFound(_) => ApiError::unauthorized(),
            other => ApiError::from(other),
        })?;

    Ok(ApiSuccess::new(StatusCode::OK, (&user).into()))
}
