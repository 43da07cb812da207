use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedAccount;

pub async fn me(Extension(account): Extension<AuthenticatedAccount>) -> ApiSuccess<MeResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        MeResponseData {
            account_id: account.account_id.to_string(),
            role: account.role.as_str(),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub account_id: String,
    pub role: &'static str,
}
