use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountRole;
use crate::domain::account::models::AccountStatus;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::Role;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountRoleRepository;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::models::AccessGrant;
use crate::domain::auth::models::AssignRoleCommand;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::LogoutCommand;
use crate::domain::auth::models::RefreshCommand;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::SessionPolicy;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::ports::TokenGenerator;
use crate::domain::errors::RepositoryError;
use crate::domain::session::models::refresh_token_digest;
use crate::domain::session::models::revoke_reason;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::models::SessionId;
use crate::domain::session::ports::RefreshSessionRepository;

/// Verified against when the login email is unknown, so the response time
/// does not reveal whether the account exists.
const TIMING_DUMMY_PASSWORD: &str = "timing-equalization-dummy-password";

/// Domain service implementation for authentication use cases.
///
/// Holds only shared, stateless collaborators. All mutable state lives in the
/// repositories.
pub struct AuthService<AR, RR, SR, PH, TG>
where
    AR: AccountRepository,
    RR: AccountRoleRepository,
    SR: RefreshSessionRepository,
    PH: PasswordHasher,
    TG: TokenGenerator,
{
    accounts: Arc<AR>,
    roles: Arc<RR>,
    sessions: Arc<SR>,
    password_hasher: Arc<PH>,
    tokens: Arc<TG>,
    policy: SessionPolicy,
    dummy_hash: OnceLock<Option<String>>,
}

impl<AR, RR, SR, PH, TG> AuthService<AR, RR, SR, PH, TG>
where
    AR: AccountRepository,
    RR: AccountRoleRepository,
    SR: RefreshSessionRepository,
    PH: PasswordHasher,
    TG: TokenGenerator,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `accounts` - Account persistence implementation
    /// * `roles` - Account role persistence implementation
    /// * `sessions` - Refresh session persistence implementation
    /// * `password_hasher` - Credential hashing implementation
    /// * `tokens` - Access/refresh token signer
    pub fn new(
        accounts: Arc<AR>,
        roles: Arc<RR>,
        sessions: Arc<SR>,
        password_hasher: Arc<PH>,
        tokens: Arc<TG>,
    ) -> Self {
        Self {
            accounts,
            roles,
            sessions,
            password_hasher,
            tokens,
            policy: SessionPolicy::default(),
            dummy_hash: OnceLock::new(),
        }
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        let normalized = policy.normalized();
        if normalized.reuse_grace != policy.reuse_grace {
            tracing::warn!(
                requested_seconds = policy.reuse_grace.num_seconds(),
                applied_seconds = normalized.reuse_grace.num_seconds(),
                "Reuse grace window raised to the minimum"
            );
        }
        self.policy = normalized;
        self
    }

    fn equalize_login_timing(&self, password: &str) {
        let dummy = self.dummy_hash.get_or_init(|| {
            self.password_hasher
                .hash(TIMING_DUMMY_PASSWORD)
                .map_err(|e| tracing::warn!(error = %e, "Failed to prepare dummy password hash"))
                .ok()
        });

        if let Some(hash) = dummy {
            let _ = self.password_hasher.verify(password, hash);
        }
    }

    async fn current_role(&self, account_id: &AccountId) -> Result<Role, AuthError> {
        self.roles
            .find(account_id)
            .await
            .map_err(storage("find account role"))?
            .map(|role| role.role)
            .ok_or_else(|| {
                tracing::error!(account_id = %account_id, "Account has no role record");
                AuthError::Internal("Account role is missing".to_string())
            })
    }

    /// Mint a token pair for a session id that is about to be persisted.
    fn issue_tokens(
        &self,
        account_id: &AccountId,
        role: Role,
        session_id: &SessionId,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self
            .tokens
            .generate_access_token(account_id, role)
            .map_err(signing_failure)?;
        let refresh_token = self
            .tokens
            .generate_refresh_token(account_id, session_id)
            .map_err(signing_failure)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.tokens.access_token_ttl().num_seconds(),
        })
    }

    /// Load the session behind a refresh token and check it belongs to the
    /// token subject.
    async fn load_session(&self, refresh_token: &str) -> Result<RefreshSession, AuthError> {
        let (account_id, session_id) = self
            .tokens
            .validate_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let session = self
            .sessions
            .find_by_id(&session_id)
            .await
            .map_err(storage("find refresh session"))?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if session.account_id != account_id {
            tracing::warn!(
                session_id = %session.id,
                account_id = %account_id,
                "Refresh token subject does not own the session"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(session)
    }

    /// React to a refresh token whose session is no longer active.
    ///
    /// A replay shortly after a rotation is a client double-submit. Anything
    /// else revokes the whole lineage below the session and every other
    /// session of the account. Failures are logged only; the caller always
    /// gets `InvalidRefreshToken`.
    async fn handle_reuse(&self, session: &RefreshSession, now: DateTime<Utc>) {
        if session.rotated_within(now, self.policy.reuse_grace) {
            tracing::info!(
                session_id = %session.id,
                account_id = %session.account_id,
                "Rotated refresh token resubmitted within grace window"
            );
            return;
        }

        tracing::warn!(
            session_id = %session.id,
            account_id = %session.account_id,
            revoke_reason = session.revoke_reason.as_deref().unwrap_or("expired"),
            "Refresh token reuse detected, revoking session lineage"
        );

        match self
            .sessions
            .revoke_descendants(&session.id, now, revoke_reason::REUSE_DETECTED)
            .await
        {
            Ok(count) => {
                tracing::info!(session_id = %session.id, revoked = count, "Revoked descendant sessions")
            }
            Err(e) => tracing::error!(
                session_id = %session.id,
                error = %e,
                "Failed to revoke descendant sessions"
            ),
        }

        match self
            .sessions
            .revoke_all_for_account(&session.account_id, now, revoke_reason::REUSE_DETECTED)
            .await
        {
            Ok(count) => tracing::info!(
                account_id = %session.account_id,
                revoked = count,
                "Revoked remaining account sessions"
            ),
            Err(e) => tracing::error!(
                account_id = %session.account_id,
                error = %e,
                "Failed to revoke account sessions"
            ),
        }
    }

    async fn require_account(&self, account_id: &AccountId) -> Result<Account, AuthError> {
        self.accounts
            .find_by_id(account_id)
            .await
            .map_err(storage("find account"))?
            .ok_or_else(|| AuthError::NotFound(format!("account {}", account_id)))
    }
}

#[async_trait]
impl<AR, RR, SR, PH, TG> AuthServicePort for AuthService<AR, RR, SR, PH, TG>
where
    AR: AccountRepository,
    RR: AccountRoleRepository,
    SR: RefreshSessionRepository,
    PH: PasswordHasher,
    TG: TokenGenerator,
{
    async fn register(&self, command: RegisterCommand) -> Result<AccountId, AuthError> {
        if command.email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        if command.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let email = EmailAddress::new(command.email)?;
        let password_hash = self.password_hasher.hash(&command.password)?;
        let account =
            Account::new(email, password_hash).map_err(|e| AuthError::Internal(e.to_string()))?;
        let role = AccountRole::new(account.id);

        let account = self
            .accounts
            .create(account, role)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists(_) => {
                    AuthError::AlreadyExists("Email is already registered".to_string())
                }
                other => storage("create account")(other),
            })?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(account.id)
    }

    async fn login(&self, command: LoginCommand) -> Result<TokenPair, AuthError> {
        let account = match EmailAddress::new(command.email) {
            Ok(email) => self
                .accounts
                .find_by_email(&email)
                .await
                .map_err(storage("find account by email"))?,
            Err(_) => None,
        };

        let account = match account {
            Some(account) => account,
            None => {
                self.equalize_login_timing(&command.password);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .password_hasher
            .verify(&command.password, &account.password_hash)
        {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.can_login() {
            tracing::info!(account_id = %account.id, status = %account.status, "Login refused for inactive account");
            return Err(AuthError::CannotLogin);
        }

        let now = Utc::now();
        if let Err(e) = self.accounts.mark_login(&account.id, now).await {
            tracing::warn!(account_id = %account.id, error = %e, "Failed to record login time");
        }

        let role = self.current_role(&account.id).await?;
        let session_id = SessionId::new();
        let tokens = self.issue_tokens(&account.id, role, &session_id)?;

        let session = RefreshSession::start(
            session_id,
            account.id,
            refresh_token_digest(&tokens.refresh_token),
            command.client,
            now,
            self.tokens.refresh_token_ttl(),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.sessions
            .create(session)
            .await
            .map_err(storage("create refresh session"))?;

        tracing::info!(account_id = %account.id, session_id = %session_id, "Login succeeded");

        Ok(tokens)
    }

    async fn refresh_session(&self, command: RefreshCommand) -> Result<TokenPair, AuthError> {
        let mut session = self.load_session(&command.refresh_token).await?;
        let now = Utc::now();

        if !session.is_active_at(now) {
            self.handle_reuse(&session, now).await;
            return Err(AuthError::InvalidRefreshToken);
        }

        if !session.matches_token(&command.refresh_token) {
            tracing::warn!(session_id = %session.id, "Refresh token does not match session hash");
            return Err(AuthError::InvalidRefreshToken);
        }

        if !command.client.satisfies(&session.client()) {
            tracing::warn!(
                session_id = %session.id,
                account_id = %session.account_id,
                "Refresh attempted from a different client"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let role = self.current_role(&session.account_id).await?;
        let child_id = SessionId::new();
        let tokens = self.issue_tokens(&session.account_id, role, &child_id)?;

        let child = session
            .rotate(
                child_id,
                refresh_token_digest(&tokens.refresh_token),
                now,
                self.tokens.refresh_token_ttl(),
            )
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        session
            .revoke_at(now, Some(revoke_reason::ROTATION))
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let rotated = self
            .sessions
            .rotate(&session, child)
            .await
            .map_err(storage("rotate refresh session"))?;

        if !rotated {
            tracing::info!(session_id = %session.id, "Concurrent rotation lost the race");
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::debug!(
            account_id = %session.account_id,
            parent_session_id = %session.id,
            session_id = %child_id,
            "Refresh session rotated"
        );

        Ok(tokens)
    }

    async fn logout(&self, command: LogoutCommand) -> Result<(), AuthError> {
        let mut session = self.load_session(&command.refresh_token).await?;

        if !session.is_active() || !session.matches_token(&command.refresh_token) {
            return Err(AuthError::InvalidRefreshToken);
        }

        session
            .revoke(Some(revoke_reason::LOGOUT))
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let revoked = self
            .sessions
            .revoke(&session)
            .await
            .map_err(storage("revoke refresh session"))?;

        if !revoked {
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!(account_id = %session.account_id, session_id = %session.id, "Logged out");

        Ok(())
    }

    async fn validate_access_token(&self, token: &str) -> Result<AccessGrant, AuthError> {
        let (account_id, role) = self
            .tokens
            .validate_access_token(token)
            .map_err(|_| AuthError::InvalidAccessToken)?;

        let account = self
            .accounts
            .find_by_id(&account_id)
            .await
            .map_err(storage("find account"))?
            .ok_or(AuthError::InvalidAccessToken)?;

        if !account.can_login() {
            return Err(AuthError::CannotLogin);
        }

        Ok(AccessGrant { account_id, role })
    }

    async fn assign_role(&self, command: AssignRoleCommand) -> Result<AccountRole, AuthError> {
        let account_id = AccountId::from_string(&command.account_id)?;

        let mut role = self
            .roles
            .find(&account_id)
            .await
            .map_err(storage("find account role"))?
            .ok_or_else(|| AuthError::NotFound(format!("role for account {}", account_id)))?;

        role.assign(&command.role)
            .map_err(|e| AuthError::CannotAssign(e.to_string()))?;

        let role = self
            .roles
            .update(role)
            .await
            .map_err(storage("update account role"))?;

        tracing::info!(account_id = %account_id, role = %role.role, "Role assigned");

        Ok(role)
    }

    async fn block_account(&self, account_id: &AccountId) -> Result<u64, AuthError> {
        let mut account = self.require_account(account_id).await?;
        account
            .block()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        self.accounts
            .update_status(account_id, AccountStatus::Blocked)
            .await
            .map_err(storage("update account status"))?;

        let revoked = self
            .sessions
            .revoke_all_for_account(account_id, Utc::now(), revoke_reason::ACCOUNT_BLOCKED)
            .await
            .map_err(storage("revoke account sessions"))?;

        tracing::info!(account_id = %account_id, revoked, "Account blocked");

        Ok(revoked)
    }

    async fn verify_email(&self, account_id: &AccountId) -> Result<(), AuthError> {
        self.require_account(account_id).await?;

        self.accounts
            .verify_email(account_id)
            .await
            .map_err(storage("verify account email"))
    }

    async fn revoke_all_sessions(&self, account_id: &AccountId) -> Result<u64, AuthError> {
        self.require_account(account_id).await?;

        let revoked = self
            .sessions
            .revoke_all_for_account(account_id, Utc::now(), revoke_reason::ADMIN_REVOKE)
            .await
            .map_err(storage("revoke account sessions"))?;

        tracing::info!(account_id = %account_id, revoked, "Sessions revoked by administrator");

        Ok(revoked)
    }

    async fn list_active_sessions(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<RefreshSession>, AuthError> {
        self.sessions
            .list_active_for_account(account_id, Utc::now())
            .await
            .map_err(storage("list active sessions"))
    }

    async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        let removed = self
            .sessions
            .delete_expired(Utc::now())
            .await
            .map_err(storage("delete expired sessions"))?;

        if removed > 0 {
            tracing::debug!(removed, "Purged expired refresh sessions");
        }

        Ok(removed)
    }
}

/// Wrap a repository failure, logging the cause that the error's display
/// hides.
fn storage(operation: &'static str) -> impl Fn(RepositoryError) -> AuthError {
    move |cause| {
        tracing::error!(operation, error = %cause, "Storage operation failed");
        AuthError::Storage { operation, cause }
    }
}

fn signing_failure(err: TokenError) -> AuthError {
    tracing::error!(error = %err, "Failed to sign token");
    AuthError::Internal("Token signing failed".to_string())
}
