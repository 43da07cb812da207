use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::session::models::RefreshSession;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

/// Active sessions of the calling account, newest first
pub async fn list_sessions<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(account): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<Vec<SessionData>>, ApiError> {
    state
        .auth_service
        .list_active_sessions(&account.account_id)
        .await
        .map_err(ApiError::from)
        .map(|sessions| {
            ApiSuccess::new(
                StatusCode::OK,
                sessions.iter().map(SessionData::from).collect(),
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl From<&RefreshSession> for SessionData {
    fn from(session: &RefreshSession) -> Self {
        Self {
            id: session.id.to_string(),
            created_at: session.created_at,
            expires_at: session.expires_at,
            ip: session.ip.clone(),
            user_agent: session.user_agent.clone(),
        }
    }
}
