use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::enforce_rate_limit;
use super::ApiError;
use super::ApiSuccess;
use super::SessionResponseData;
use crate::domain::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    client: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    enforce_rate_limit(&state, "login", state.login_limit, client).await?;

    // A username that could never exist is just a wrong credential
    let username = Username::new(body.username).map_err(|_| ApiError::unauthorized())?;

    let user = state
        .account_service
        .verify_credentials(&username, &body.password)
        .await?;

    let issued = state
        .gateway
        .login(&user.id.to_string(), user.username.as_str())
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SessionResponseData {
            user: (&user).into(),
            token: issued.token,
            expires_at: issued.claims.expires_at(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}
