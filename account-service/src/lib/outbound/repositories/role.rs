use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::PgPool;
use sqlx::Postgres;
use uuid::Uuid;

use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountRole;
use crate::domain::account::models::Role;
use crate::domain::account::ports::AccountRoleRepository;
use crate::domain::errors::RepositoryError;
use crate::outbound::repositories::database_error;

#[derive(sqlx::FromRow)]
struct AccountRoleRow {
    account_id: Uuid,
    role: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRoleRow> for AccountRole {
    type Error = RepositoryError;

    fn try_from(row: AccountRoleRow) -> Result<Self, Self::Error> {
        Ok(AccountRole {
            account_id: AccountId(row.account_id),
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| RepositoryError::Corrupt(e.to_string()))?,
            updated_at: row.updated_at,
        })
    }
}

pub(super) fn insert_query(role: &AccountRole) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO account_roles (account_id, role, updated_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(role.account_id.0)
    .bind(role.role.as_str())
    .bind(role.updated_at)
}

pub(super) fn insert_error(err: sqlx::Error, role: &AccountRole) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::AlreadyExists(role.account_id.to_string());
        }
    }
    database_error(err)
}

pub struct PostgresAccountRoleRepository {
    pool: PgPool,
}

impl PostgresAccountRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRoleRepository for PostgresAccountRoleRepository {
    async fn create(&self, role: AccountRole) -> Result<AccountRole, RepositoryError> {
        insert_query(&role)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, &role))?;

        Ok(role)
    }

    async fn find(&self, account_id: &AccountId) -> Result<Option<AccountRole>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRoleRow>(
            r#"
            SELECT account_id, role, updated_at
            FROM account_roles
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(AccountRole::try_from).transpose()
    }

    async fn update(&self, role: AccountRole) -> Result<AccountRole, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE account_roles
            SET role = $2, updated_at = $3
            WHERE account_id = $1
            "#,
        )
        .bind(role.account_id.0)
        .bind(role.role.as_str())
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(role.account_id.to_string()));
        }

        Ok(role)
    }

    async fn delete(&self, account_id: &AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM account_roles WHERE account_id = $1")
            .bind(account_id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(account_id.to_string()));
        }

        Ok(())
    }
}
