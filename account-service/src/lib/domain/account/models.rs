use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::errors::AccountError;
use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::RoleError;

/// Account aggregate entity.
///
/// A registered credential holder. Accounts are never physically removed;
/// `Deleted` is a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub status: AccountStatus,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new active, unverified account.
    ///
    /// # Errors
    /// * `MissingPasswordHash` - Password hash is empty
    pub fn new(email: EmailAddress, password_hash: String) -> Result<Self, AccountError> {
        if password_hash.is_empty() {
            return Err(AccountError::MissingPasswordHash);
        }

        let now = Utc::now();

        Ok(Self {
            id: AccountId::new(),
            email,
            password_hash,
            status: AccountStatus::Active,
            email_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        })
    }

    /// Only active accounts may authenticate or keep using issued tokens.
    pub fn can_login(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Block the account.
    ///
    /// # Errors
    /// * `Deleted` - Deleted accounts cannot change status
    pub fn block(&mut self) -> Result<(), AccountError> {
        if self.status == AccountStatus::Deleted {
            return Err(AccountError::Deleted);
        }

        self.status = AccountStatus::Blocked;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn verify_email(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn mark_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser and normalized to lower case, which makes
/// equality and uniqueness case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, normalized email address.
    ///
    /// # Errors
    /// * `Empty` - Email is empty or whitespace
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let normalized = email.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }

        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Blocked,
    Deleted,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
            AccountStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "blocked" => Ok(AccountStatus::Blocked),
            "deleted" => Ok(AccountStatus::Deleted),
            other => Err(AccountError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(RoleError::InvalidValue(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role held by an account (one per account).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRole {
    pub account_id: AccountId,
    pub role: Role,
    pub updated_at: DateTime<Utc>,
}

impl AccountRole {
    /// Default role record created at registration.
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            role: Role::User,
            updated_at: Utc::now(),
        }
    }

    /// Assign a role by name. Re-assigning the current role is allowed.
    ///
    /// # Errors
    /// * `InvalidValue` - Name is not one of the known roles
    pub fn assign(&mut self, role: &str) -> Result<(), RoleError> {
        self.role = role.parse()?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
