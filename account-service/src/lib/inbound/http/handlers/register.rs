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
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Password;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::Username;
use crate::inbound::http::router::AppState;

/// Create an account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    client: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    enforce_rate_limit(&state, "register", state.register_limit, client).await?;

    let command = body.try_into_domain()?;
    let user = state.account_service.register(command).await?;

    let issued = state
        .gateway
        .login(&user.id.to_string(), user.username.as_str())
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        SessionResponseData {
            user: (&user).into(),
            token: issued.token,
            expires_at: issued.claims.expires_at(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    username: String,
    email: String,
    password: String,
}

impl RegisterRequestBody {
    fn try_into_domain(self) -> Result<RegisterCommand, ApiError> {
        let username = Username::new(self.username)
            .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;
        let email =
            EmailAddress::new(self.email).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;
        let password =
            Password::new(self.password).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

        Ok(RegisterCommand::new(username, email, password))
    }
}
