use async_trait::async_trait;
use chrono::Duration;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountRole;
use crate::domain::account::models::Role;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::PasswordHashError;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::models::AccessGrant;
use crate::domain::auth::models::AssignRoleCommand;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LogoutCommand;
use crate::domain::auth::models::RefreshCommand;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::TokenPair;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::models::SessionId;

/// Port for authentication use cases.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account with the default `user` role.
    ///
    /// # Arguments
    /// * `command` - Raw email and password
    ///
    /// # Returns
    /// Identifier of the created account
    ///
    /// # Errors
    /// * `Validation` - Email or password missing, malformed or too long
    /// * `AlreadyExists` - Email is already registered (case-insensitive)
    /// * `Storage` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<AccountId, AuthError>;

    /// Authenticate with credentials and open a refresh session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `CannotLogin` - Account is blocked or deleted
    /// * `Storage` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new pair, revoking the old session.
    ///
    /// Presenting a token whose session is no longer active is treated as a
    /// reuse signal.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token invalid, reused, unbound or lost a race
    /// * `Storage` - Database operation failed
    async fn refresh_session(&self, command: RefreshCommand) -> Result<TokenPair, AuthError>;

    /// Revoke the session behind a refresh token.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token invalid or session already inactive
    /// * `Storage` - Database operation failed
    async fn logout(&self, command: LogoutCommand) -> Result<(), AuthError>;

    /// Verify an access token against the current account status.
    ///
    /// # Errors
    /// * `InvalidAccessToken` - Token invalid or account unknown
    /// * `CannotLogin` - Account is no longer active
    async fn validate_access_token(&self, token: &str) -> Result<AccessGrant, AuthError>;

    /// Change the role of an account.
    ///
    /// # Errors
    /// * `Validation` - Account ID is malformed
    /// * `NotFound` - Account has no role record
    /// * `CannotAssign` - Role name is unknown
    async fn assign_role(&self, command: AssignRoleCommand) -> Result<AccountRole, AuthError>;

    /// Block an account and revoke all of its sessions.
    ///
    /// # Returns
    /// Number of sessions revoked
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `Validation` - Account is deleted
    async fn block_account(&self, account_id: &AccountId) -> Result<u64, AuthError>;

    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn verify_email(&self, account_id: &AccountId) -> Result<(), AuthError>;

    /// Revoke every active session of an account.
    ///
    /// # Returns
    /// Number of sessions revoked
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn revoke_all_sessions(&self, account_id: &AccountId) -> Result<u64, AuthError>;

    /// Active sessions of an account, newest first.
    async fn list_active_sessions(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<RefreshSession>, AuthError>;

    /// Delete sessions past their expiry.
    ///
    /// # Returns
    /// Number of sessions removed
    async fn purge_expired_sessions(&self) -> Result<u64, AuthError>;
}

/// One-way credential hashing.
pub trait PasswordHasher: Send + Sync + 'static {
    /// # Errors
    /// * `InvalidInput` - Password empty or longer than the configured limit
    /// * `Failed` - Hashing itself failed
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Never fails: mismatches and unparsable hashes both yield `false`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Signs and verifies access and refresh tokens.
pub trait TokenGenerator: Send + Sync + 'static {
    fn generate_access_token(
        &self,
        account_id: &AccountId,
        role: Role,
    ) -> Result<String, TokenError>;

    fn generate_refresh_token(
        &self,
        account_id: &AccountId,
        session_id: &SessionId,
    ) -> Result<String, TokenError>;

    /// # Errors
    /// * `Invalid` - Any verification failure
    fn validate_access_token(&self, token: &str) -> Result<(AccountId, Role), TokenError>;

    /// # Errors
    /// * `Invalid` - Any verification failure
    fn validate_refresh_token(&self, token: &str) -> Result<(AccountId, SessionId), TokenError>;

    fn access_token_ttl(&self) -> Duration;

    fn refresh_token_ttl(&self) -> Duration;
}
