use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::models::AccountId;
use crate::domain::errors::RepositoryError;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::models::SessionId;

/// Persistence operations for refresh sessions.
///
/// Every revoking operation only touches rows whose `revoked_at` is still
/// unset. Storage, not the caller's memory, decides which concurrent revoke
/// wins.
#[async_trait]
pub trait RefreshSessionRepository: Send + Sync + 'static {
    /// Persist a new session.
    ///
    /// # Errors
    /// * `AlreadyExists` - Session id or token hash already stored
    async fn create(&self, session: RefreshSession) -> Result<RefreshSession, RepositoryError>;

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<RefreshSession>, RepositoryError>;

    async fn find_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<RefreshSession>, RepositoryError>;

    /// Persist the revocation carried by `session` (already revoked in
    /// memory), only if the stored row is still unrevoked.
    ///
    /// # Returns
    /// `true` if this call revoked the row, `false` if it was already revoked
    async fn revoke(&self, session: &RefreshSession) -> Result<bool, RepositoryError>;

    /// Atomically persist the revocation of `parent` (already revoked in
    /// memory) and insert `child`. The child is only inserted if the
    /// conditional revoke of the parent affected a row.
    ///
    /// # Returns
    /// `true` if the rotation happened, `false` if another rotation or
    /// revocation got there first
    async fn rotate(
        &self,
        parent: &RefreshSession,
        child: RefreshSession,
    ) -> Result<bool, RepositoryError>;

    /// Revoke every active session of an account.
    ///
    /// # Returns
    /// Number of sessions revoked
    async fn revoke_all_for_account(
        &self,
        account_id: &AccountId,
        revoked_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, RepositoryError>;

    /// Revoke every active session descending from `id` through
    /// `rotated_from`, at any depth. `id` itself is left untouched.
    ///
    /// # Returns
    /// Number of sessions revoked
    async fn revoke_descendants(
        &self,
        id: &SessionId,
        revoked_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, RepositoryError>;

    /// Remove sessions that expired before `before`.
    ///
    /// # Returns
    /// Number of sessions removed
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, RepositoryError>;

    /// Unrevoked, unexpired sessions of an account, newest first.
    async fn list_active_for_account(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, RepositoryError>;
}
