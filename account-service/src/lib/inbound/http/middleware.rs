use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Authenticate the bearer token and attach the caller's `RequestIdentity`
/// to the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let header = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Authorization header is not valid ASCII");
                return Err(ApiError::unauthorized().into_response());
            }
        },
    };

    let identity = state
        .gateway
        .authenticate(header)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    tracing::debug!(user_id = %identity.subject, "Request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
