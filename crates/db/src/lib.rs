//! PostgreSQL connection factory and migration runner.

use sqlx::postgres::PgPool;

pub mod connection;
pub mod migrate;

pub use connection::{ConnectionError, ConnectionString};

/// Shared handle through which every query is issued.
pub type Database = PgPool;

/// Open the shared handle described by the `DB_*` settings.
///
/// Failures are returned as-is; callers treat them as fatal.
pub async fn connect(
    settings: &bookshelf_kernel::settings::DatabaseSettings,
) -> Result<Database, ConnectionError> {
    let connection = ConnectionString::from_settings(settings)?;

    tracing::info!(target: "bookshelf-db", dsn = %connection.redacted(), "connecting to database");

    let pool = PgPool::connect(connection.as_str())
        .await
        .map_err(ConnectionError::Connect)?;

    tracing::info!(target: "bookshelf-db", "database connection established");
    Ok(pool)
}
