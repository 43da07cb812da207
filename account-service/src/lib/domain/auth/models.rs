use chrono::Duration;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::Role;
use crate::domain::session::models::ClientMetadata;

/// Command to register a new account (raw input, validated by the service).
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
}

/// Command to log in with credentials.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
    pub client: ClientMetadata,
}

/// Command to rotate a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshCommand {
    pub refresh_token: String,
    pub client: ClientMetadata,
}

#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct AssignRoleCommand {
    pub account_id: String,
    pub role: String,
}

/// Tokens handed to a client after login or rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub access_expires_in: i64,
}

/// Identity established by a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGrant {
    pub account_id: AccountId,
    pub role: Role,
}

/// Smallest accepted reuse grace window. A concurrent refresh that loses the
/// rotation race sees the parent already revoked for rotation; the window must
/// cover that request or the loser would revoke the winner's new session.
pub const MIN_REUSE_GRACE_SECONDS: i64 = 1;

/// Tunables for refresh session handling.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Replays of a token rotated less than this long ago are treated as a
    /// client double-submit rather than theft. Never below
    /// [`MIN_REUSE_GRACE_SECONDS`] once applied to a service.
    pub reuse_grace: Duration,
}

impl SessionPolicy {
    /// Policy with the grace window raised to the minimum when needed.
    pub fn normalized(self) -> Self {
        Self {
            reuse_grace: self
                .reuse_grace
                .max(Duration::seconds(MIN_REUSE_GRACE_SECONDS)),
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            reuse_grace: Duration::seconds(10),
        }
    }
}
