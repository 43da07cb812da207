use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountRole;
use crate::domain::account::models::AccountStatus;
use crate::domain::account::models::EmailAddress;
use crate::domain::errors::RepositoryError;

/// Persistence operations for the account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account together with its initial role. Either both
    /// records are stored or neither is.
    ///
    /// # Errors
    /// * `AlreadyExists` - Email is already registered (case-insensitive)
    /// * `Database` - Database operation failed
    async fn create(&self, account: Account, role: AccountRole)
        -> Result<Account, RepositoryError>;

    /// Retrieve account by normalized email address.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress)
        -> Result<Option<Account>, RepositoryError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Record a successful login.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn mark_login(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError>;

    /// Flag the account email as verified.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn verify_email(&self, id: &AccountId) -> Result<(), RepositoryError>;

    /// Change the account lifecycle status.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn update_status(
        &self,
        id: &AccountId,
        status: AccountStatus,
    ) -> Result<(), RepositoryError>;
}

/// Persistence operations for account roles.
#[async_trait]
pub trait AccountRoleRepository: Send + Sync + 'static {
    /// # Errors
    /// * `AlreadyExists` - Account already has a role record
    async fn create(&self, role: AccountRole) -> Result<AccountRole, RepositoryError>;

    async fn find(&self, account_id: &AccountId) -> Result<Option<AccountRole>, RepositoryError>;

    /// # Errors
    /// * `NotFound` - Account has no role record
    async fn update(&self, role: AccountRole) -> Result<AccountRole, RepositoryError>;

    /// # Errors
    /// * `NotFound` - Account has no role record
    async fn delete(&self, account_id: &AccountId) -> Result<(), RepositoryError>;
}
