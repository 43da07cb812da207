use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::AccountRole;
use crate::domain::auth::models::AssignRoleCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn assign_role<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Path(account_id): Path<String>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<ApiSuccess<AccountRoleData>, ApiError> {
    state
        .auth_service
        .assign_role(AssignRoleCommand {
            account_id,
            role: body.role,
        })
        .await
        .map_err(ApiError::from)
        .map(|ref role| ApiSuccess::new(StatusCode::OK, role.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignRoleRequest {
    role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRoleData {
    pub account_id: String,
    pub role: &'static str,
    pub updated_at: DateTime<Utc>,
}

impl From<&AccountRole> for AccountRoleData {
    fn from(role: &AccountRole) -> Self {
        Self {
            account_id: role.account_id.to_string(),
            role: role.role.as_str(),
            updated_at: role.updated_at,
        }
    }
}
