use chrono::Duration;

use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::RefreshClaims;
use crate::jwt::TokenType;

/// Shortest secret accepted for HS256 signing, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Settings for a [`TokenGenerator`].
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub leeway_seconds: u64,
}

/// Token generation and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Any validation failure. The concrete reason is only logged.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Invalid token settings: {0}")]
    InvalidSettings(String),
}

/// Issues and verifies access and refresh tokens.
///
/// Access and refresh tokens are signed with distinct secrets and tagged with
/// a `type` claim, so one kind can never be replayed as the other. Stateless:
/// build one at startup and share it.
pub struct TokenGenerator {
    access: JwtHandler,
    refresh: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenGenerator {
    /// Create a token generator.
    ///
    /// # Errors
    /// * `InvalidSettings` - A secret is shorter than 32 bytes, both secrets
    ///   are equal, or a TTL is not positive
    pub fn new(settings: TokenSettings) -> Result<Self, TokenError> {
        if settings.access_secret.len() < MIN_SECRET_LENGTH
            || settings.refresh_secret.len() < MIN_SECRET_LENGTH
        {
            return Err(TokenError::InvalidSettings(format!(
                "secrets must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        if settings.access_secret == settings.refresh_secret {
            return Err(TokenError::InvalidSettings(
                "access and refresh secrets must differ".to_string(),
            ));
        }

        if settings.access_ttl <= Duration::zero() || settings.refresh_ttl <= Duration::zero() {
            return Err(TokenError::InvalidSettings(
                "token lifetimes must be positive".to_string(),
            ));
        }

        Ok(Self {
            access: JwtHandler::new(&settings.access_secret).with_leeway(settings.leeway_seconds),
            refresh: JwtHandler::new(&settings.refresh_secret)
                .with_leeway(settings.leeway_seconds),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token carrying the subject and its role.
    pub fn generate_access_token(&self, subject: &str, role: &str) -> Result<String, TokenError> {
        let claims = AccessClaims::new(subject, role, self.access_ttl);

        self.access
            .encode(&claims)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Sign a refresh token whose `jti` is the backing session id.
    pub fn generate_refresh_token(
        &self,
        subject: &str,
        session_id: &str,
    ) -> Result<String, TokenError> {
        let claims = RefreshClaims::new(subject, session_id, self.refresh_ttl);

        self.refresh
            .encode(&claims)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify an access token.
    ///
    /// # Errors
    /// * `InvalidToken` - Any signature, algorithm, timing or type failure
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.access
            .decode(token, TokenType::Access)
            .map_err(|e| rejected("access", e))
    }

    /// Verify a refresh token.
    ///
    /// # Errors
    /// * `InvalidToken` - Any signature, algorithm, timing or type failure
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.refresh
            .decode(token, TokenType::Refresh)
            .map_err(|e| rejected("refresh", e))
    }
}

fn rejected(kind: &'static str, error: JwtError) -> TokenError {
    tracing::debug!(token_kind = kind, reason = %error, "Token rejected");
    TokenError::InvalidToken
}
