use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::login::TokenResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::RefreshCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::client::ClientInfo;
use crate::inbound::http::router::AppState;

pub async fn refresh<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    client: ClientInfo,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let command = RefreshCommand {
        refresh_token: body.refresh_token,
        client: client.into(),
    };

    state
        .auth_service
        .refresh_session(command)
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair.into()))
}

/// Body shared by refresh and logout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}
