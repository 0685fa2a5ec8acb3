use auth::RequestIdentity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Revoke the presented token.
///
/// Succeeds only once the revocation is stored; the token is then rejected
/// by every node sharing the store.
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    state.gateway.logout(&identity).await?;

    tracing::info!(user_id = %identity.subject, token_id = %identity.token_id, "User logged out");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Logged out".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
