use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::RevokedSessionsData;
use crate::domain::account::models::AccountId;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn block_account<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<RevokedSessionsData>, ApiError> {
    let account_id = AccountId::from_string(&id).map_err(AuthError::from)?;

    state
        .auth_service
        .block_account(&account_id)
        .await
        .map_err(ApiError::from)
        .map(|revoked_sessions| {
            ApiSuccess::new(
                StatusCode::OK,
                RevokedSessionsData {
                    account_id: account_id.to_string(),
                    revoked_sessions,
                },
            )
        })
}
