use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Discriminates access tokens from refresh tokens.
///
/// Serialized into the `type` claim so a token of one kind is never accepted
/// where the other is expected, even if the secrets were misconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (account identifier)
    pub sub: String,

    /// Role snapshot at issuance
    pub role: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create access claims issued now and expiring after `ttl`.
    pub fn new(sub: impl ToString, role: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: sub.to_string(),
            role: role.to_string(),
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Claims carried by a long-lived refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Subject (account identifier)
    pub sub: String,

    /// JWT ID: the server-side refresh session identifier
    pub jti: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl RefreshClaims {
    /// Create refresh claims issued now and expiring after `ttl`.
    pub fn new(sub: impl ToString, jti: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: sub.to_string(),
            jti: jti.to_string(),
            token_type: TokenType::Refresh,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Access to the timing claims shared by every token kind.
pub trait TimedClaims {
    fn issued_at(&self) -> i64;
    fn expires_at(&self) -> i64;
    fn token_type(&self) -> TokenType;

    /// Check if token is expired.
    fn is_expired(&self, current_timestamp: i64) -> bool {
        self.expires_at() < current_timestamp
    }
}

impl TimedClaims for AccessClaims {
    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn token_type(&self) -> TokenType {
        self.token_type
    }
}

impl TimedClaims for RefreshClaims {
    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn token_type(&self) -> TokenType {
        self.token_type
    }
}
