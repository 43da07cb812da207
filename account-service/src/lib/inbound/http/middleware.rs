use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::Role;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::AUTHENTICATION_FAILED;
use crate::inbound::http::router::AppState;

/// Extension type to store the authenticated account in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub role: Role,
}

/// Middleware that validates the bearer access token against the current
/// account status and adds the account to request extensions
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let grant = state
        .auth_service
        .validate_access_token(token)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(AuthenticatedAccount {
        account_id: grant.account_id,
        role: grant.role,
    });

    Ok(next.run(req).await)
}

/// Middleware that only lets administrators through. Must run after
/// [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let account = req
        .extensions()
        .get::<AuthenticatedAccount>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized(AUTHENTICATION_FAILED.to_string()))?;

    if account.role != Role::Admin {
        tracing::warn!(account_id = %account.account_id, "Administrative route refused");
        return Err(ApiError::Forbidden(
            "Administrator role required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized(
                "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
            )
        })
}
