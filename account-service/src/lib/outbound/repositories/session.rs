use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::PgPool;
use sqlx::Postgres;
use uuid::Uuid;

use crate::domain::account::models::AccountId;
use crate::domain::errors::RepositoryError;
use crate::domain::session::models::RefreshSession;
use crate::domain::session::models::SessionId;
use crate::domain::session::ports::RefreshSessionRepository;
use crate::outbound::repositories::database_error;

const SESSION_COLUMNS: &str = "id, account_id, token_hash, created_at, expires_at, \
     revoked_at, revoke_reason, rotated_from, ip, user_agent";

#[derive(sqlx::FromRow)]
struct RefreshSessionRow {
    id: Uuid,
    account_id: Uuid,
    token_hash: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    revoke_reason: Option<String>,
    rotated_from: Option<Uuid>,
    ip: Option<String>,
    user_agent: Option<String>,
}

impl From<RefreshSessionRow> for RefreshSession {
    fn from(row: RefreshSessionRow) -> Self {
        RefreshSession {
            id: SessionId(row.id),
            account_id: AccountId(row.account_id),
            refresh_token_hash: row.token_hash,
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            revoke_reason: row.revoke_reason,
            rotated_from: row.rotated_from.map(SessionId),
            ip: row.ip,
            user_agent: row.user_agent,
        }
    }
}

/// Revocation timestamp carried by a session revoked in memory.
fn revoked_at(session: &RefreshSession) -> Result<DateTime<Utc>, RepositoryError> {
    session.revoked_at.ok_or_else(|| {
        RepositoryError::Corrupt(format!("session {} is not revoked", session.id))
    })
}

fn insert_query(session: &RefreshSession) -> Query<'_, Postgres, PgArguments> {
    sqlx::query(
        r#"
        INSERT INTO refresh_sessions
            (id, account_id, token_hash, created_at, expires_at,
             revoked_at, revoke_reason, rotated_from, ip, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(session.id.0)
    .bind(session.account_id.0)
    .bind(&session.refresh_token_hash)
    .bind(session.created_at)
    .bind(session.expires_at)
    .bind(session.revoked_at)
    .bind(session.revoke_reason.as_deref())
    .bind(session.rotated_from.map(|id| id.0))
    .bind(session.ip.as_deref())
    .bind(session.user_agent.as_deref())
}

fn insert_error(err: sqlx::Error, session: &RefreshSession) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::AlreadyExists(session.id.to_string());
        }
    }
    database_error(err)
}

pub struct PostgresRefreshSessionRepository {
    pool: PgPool,
}

impl PostgresRefreshSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshSessionRepository for PostgresRefreshSessionRepository {
    async fn create(&self, session: RefreshSession) -> Result<RefreshSession, RepositoryError> {
        insert_query(&session)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, &session))?;

        Ok(session)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<RefreshSession>, RepositoryError> {
        let row = sqlx::query_as::<_, RefreshSessionRow>(&format!(
            "SELECT {} FROM refresh_sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(RefreshSession::from))
    }

    async fn find_by_hash(
        &self,
        refresh_token_hash: &str,
    ) -> Result<Option<RefreshSession>, RepositoryError> {
        let row = sqlx::query_as::<_, RefreshSessionRow>(&format!(
            "SELECT {} FROM refresh_sessions WHERE token_hash = $1",
            SESSION_COLUMNS
        ))
        .bind(refresh_token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(RefreshSession::from))
    }

    async fn revoke(&self, session: &RefreshSession) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked_at = $2, revoke_reason = $3
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(session.id.0)
        .bind(revoked_at(session)?)
        .bind(session.revoke_reason.as_deref())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn rotate(
        &self,
        parent: &RefreshSession,
        child: RefreshSession,
    ) -> Result<bool, RepositoryError> {
        let revoked_at = revoked_at(parent)?;

        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked_at = $2, revoke_reason = $3
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(parent.id.0)
        .bind(revoked_at)
        .bind(parent.revoke_reason.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(database_error)?;
            return Ok(false);
        }

        insert_query(&child)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, &child))?;
        tx.commit().await.map_err(database_error)?;

        Ok(true)
    }

    async fn revoke_all_for_account(
        &self,
        account_id: &AccountId,
        revoked_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked_at = $2, revoke_reason = $3
            WHERE account_id = $1 AND revoked_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(account_id.0)
        .bind(revoked_at)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn revoke_descendants(
        &self,
        id: &SessionId,
        revoked_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            WITH RECURSIVE lineage AS (
                SELECT id FROM refresh_sessions WHERE rotated_from = $1
                UNION
                SELECT s.id
                FROM refresh_sessions s
                JOIN lineage l ON s.rotated_from = l.id
            )
            UPDATE refresh_sessions
            SET revoked_at = $2, revoke_reason = $3
            WHERE id IN (SELECT id FROM lineage) AND revoked_at IS NULL
            "#,
        )
        .bind(id.0)
        .bind(revoked_at)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn list_active_for_account(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshSession>, RepositoryError> {
        let rows = sqlx::query_as::<_, RefreshSessionRow>(&format!(
            "SELECT {} FROM refresh_sessions \
             WHERE account_id = $1 AND revoked_at IS NULL AND expires_at > $2 \
             ORDER BY created_at DESC",
            SESSION_COLUMNS
        ))
        .bind(account_id.0)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(RefreshSession::from).collect())
    }
}
