use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::models::AccountId;
use crate::domain::session::errors::SessionError;
use crate::domain::session::errors::SessionIdError;

/// Reasons recorded on revoked sessions.
pub mod revoke_reason {
    pub const ROTATION: &str = "token rotation";
    pub const LOGOUT: &str = "logout";
    pub const REUSE_DETECTED: &str = "refresh token reuse";
    pub const ACCOUNT_BLOCKED: &str = "account blocked";
    pub const ADMIN_REVOKE: &str = "revoked by administrator";
}

/// Digest under which a refresh token is stored and looked up.
pub fn refresh_token_digest(token: &str) -> String {
    auth::token_digest(token)
}

/// Refresh session unique identifier, embedded as the refresh token `jti`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, SessionIdError> {
        Uuid::parse_str(s)
            .map(SessionId)
            .map_err(|e| SessionIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Request metadata a session is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMetadata {
    /// Whether a request presenting `self` satisfies the binding recorded in
    /// `recorded`. Values that were never recorded are not checked; recorded
    /// values must be presented identically.
    pub fn satisfies(&self, recorded: &ClientMetadata) -> bool {
        fn bound(recorded: &Option<String>, presented: &Option<String>) -> bool {
            match recorded {
                Some(value) => presented.as_deref() == Some(value.as_str()),
                None => true,
            }
        }

        bound(&recorded.ip, &self.ip) && bound(&recorded.user_agent, &self.user_agent)
    }
}

/// Server-side record backing one outstanding refresh token.
///
/// Once `revoked_at` is set the session is terminal. Children are only built
/// through [`RefreshSession::rotate`], so `rotated_from` always names a
/// session of the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub id: SessionId,
    pub account_id: AccountId,
    pub refresh_token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoke_reason: Option<String>,
    pub rotated_from: Option<SessionId>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RefreshSession {
    /// Start a session chain at login.
    ///
    /// # Errors
    /// * `NonPositiveTtl` - `ttl` would not put expiry after creation
    pub fn start(
        id: SessionId,
        account_id: AccountId,
        refresh_token_hash: String,
        client: ClientMetadata,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, SessionError> {
        if ttl <= Duration::zero() {
            return Err(SessionError::NonPositiveTtl);
        }

        Ok(Self {
            id,
            account_id,
            refresh_token_hash,
            created_at,
            expires_at: created_at + ttl,
            revoked_at: None,
            revoke_reason: None,
            rotated_from: None,
            ip: client.ip,
            user_agent: client.user_agent,
        })
    }

    /// Build the successor of this session, carrying over account and client
    /// binding.
    ///
    /// # Errors
    /// * `NonPositiveTtl` - `ttl` would not put expiry after creation
    pub fn rotate(
        &self,
        id: SessionId,
        refresh_token_hash: String,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, SessionError> {
        let mut child = Self::start(
            id,
            self.account_id,
            refresh_token_hash,
            self.client(),
            created_at,
            ttl,
        )?;
        child.rotated_from = Some(self.id);
        Ok(child)
    }

    pub fn client(&self) -> ClientMetadata {
        ClientMetadata {
            ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether `token` is the refresh token this session was issued for.
    pub fn matches_token(&self, token: &str) -> bool {
        self.refresh_token_hash == refresh_token_digest(token)
    }

    /// Whether this session was rotated away less than `grace` before `now`.
    pub fn rotated_within(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        match (self.revoked_at, self.revoke_reason.as_deref()) {
            (Some(revoked_at), Some(revoke_reason::ROTATION)) => now - revoked_at < grace,
            _ => false,
        }
    }

    /// Revoke in memory. Persisting the revocation is the repository's job
    /// and must be conditional on the stored row still being unrevoked.
    ///
    /// # Errors
    /// * `AlreadyRevoked` - Session is already terminal
    pub fn revoke(&mut self, reason: Option<&str>) -> Result<(), SessionError> {
        self.revoke_at(Utc::now(), reason)
    }

    pub fn revoke_at(
        &mut self,
        at: DateTime<Utc>,
        reason: Option<&str>,
    ) -> Result<(), SessionError> {
        if self.revoked_at.is_some() {
            return Err(SessionError::AlreadyRevoked);
        }

        self.revoked_at = Some(at);
        self.revoke_reason = reason.map(str::to_string);
        Ok(())
    }
}
