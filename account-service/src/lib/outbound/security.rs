//! Port implementations backed by the `auth` crate.

use chrono::Duration;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::Role;
use crate::domain::auth::errors::PasswordHashError;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::ports::TokenGenerator;
use crate::domain::session::models::SessionId;

impl PasswordHasher for auth::PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        auth::PasswordHasher::hash(self, password).map_err(|e| match e {
            auth::PasswordError::Empty | auth::PasswordError::TooLong { .. } => {
                PasswordHashError::InvalidInput(e.to_string())
            }
            other => PasswordHashError::Failed(other.to_string()),
        })
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        auth::PasswordHasher::verify(self, password, hash)
    }
}

impl TokenGenerator for auth::TokenGenerator {
    fn generate_access_token(
        &self,
        account_id: &AccountId,
        role: Role,
    ) -> Result<String, TokenError> {
        auth::TokenGenerator::generate_access_token(self, &account_id.to_string(), role.as_str())
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    fn generate_refresh_token(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
    ) -> Result<String, TokenError> {
        auth::TokenGenerator::generate_refresh_token(
            self,
            &account_id.to_string(),
            &session_id.to_string(),
        )
        .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    fn validate_access_token(&self, token: &str) -> Result<(AccountId, Role), TokenError> {
        let claims = auth::TokenGenerator::validate_access_token(self, token)
            .map_err(|_| TokenError::Invalid)?;

        let account_id = AccountId::from_string(&claims.sub).map_err(|e| {
            tracing::debug!(error = %e, "Access token subject is not an account id");
            TokenError::Invalid
        })?;
        let role = claims.role.parse::<Role>().map_err(|e| {
            tracing::debug!(error = %e, "Access token carries unknown role");
            TokenError::Invalid
        })?;

        Ok((account_id, role))
    }

    fn validate_refresh_token(&self, token: &str) -> Result<(AccountId, SessionId), TokenError> {
        let claims = auth::TokenGenerator::validate_refresh_token(self, token)
            .map_err(|_| TokenError::Invalid)?;

        let account_id = AccountId::from_string(&claims.sub).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token subject is not an account id");
            TokenError::Invalid
        })?;
        let session_id = SessionId::from_string(&claims.jti).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token id is not a session id");
            TokenError::Invalid
        })?;

        Ok((account_id, session_id))
    }

    fn access_token_ttl(&self) -> Duration {
        self.access_ttl()
    }

    fn refresh_token_ttl(&self) -> Duration {
        self.refresh_ttl()
    }
}
