use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::AccountId;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn verify_email<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<()>, ApiError> {
    let account_id = AccountId::from_string(&id).map_err(AuthError::from)?;

    state
        .auth_service
        .verify_email(&account_id)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, ()))
}
