use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::refresh::RefreshTokenRequest;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::models::LogoutCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn logout<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .auth_service
        .logout(LogoutCommand {
            refresh_token: body.refresh_token,
        })
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, ()))
}
