mod account;
mod role;
mod session;

pub use account::PostgresAccountRepository;
pub use role::PostgresAccountRoleRepository;
pub use session::PostgresRefreshSessionRepository;

use crate::domain::errors::RepositoryError;

fn database_error(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(err.to_string())
}
