//! Applies module migrations once, tracking them in a ledger table.

use bookshelf_kernel::Migration;
use sqlx::{Connection, PgConnection};
use thiserror::Error;

use crate::Database;

/// Name of the table recording applied migrations.
pub const LEDGER_TABLE: &str = "_bookshelf_migrations";

/// Session-level advisory lock key serializing concurrent migration runs.
const MIGRATION_LOCK_KEY: i64 = 0x626f_6f6b_7368_656c;

const LEDGER_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _bookshelf_migrations (
        module     TEXT        NOT NULL,
        id         TEXT        NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (module, id)
    )
"#;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("could not acquire migration lock")]
    Lock(#[source] sqlx::Error),

    #[error("could not prepare migration ledger")]
    Ledger(#[source] sqlx::Error),

    #[error("migration '{module}/{id}' failed")]
    Apply {
        module: String,
        id: &'static str,
        source: sqlx::Error,
    },
}

/// Outcome of a migration run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Apply every migration not yet in the ledger, in the order given.
///
/// The whole run holds an advisory lock on one pooled connection, so
/// processes starting together apply each migration exactly once. Each
/// migration runs in its own transaction together with its ledger row, so a
/// failed migration leaves no partial record behind.
pub async fn run(
    db: &Database,
    migrations: &[(String, Migration)],
) -> Result<MigrationReport, MigrationError> {
    let mut conn = db.acquire().await.map_err(MigrationError::Lock)?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(MigrationError::Lock)?;

    let result = run_locked(&mut conn, migrations).await;

    let unlocked = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await;
    if let Err(err) = unlocked {
        // Closing the session releases the lock.
        tracing::warn!(target: "bookshelf-db", error = %err, "could not release migration lock");
        drop(conn.detach());
    }

    result
}

async fn run_locked(
    conn: &mut PgConnection,
    migrations: &[(String, Migration)],
) -> Result<MigrationReport, MigrationError> {
    sqlx::raw_sql(LEDGER_DDL)
        .execute(&mut *conn)
        .await
        .map_err(MigrationError::Ledger)?;

    let mut report = MigrationReport::default();

    for (module, migration) in migrations {
        let applied: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM _bookshelf_migrations WHERE module = $1 AND id = $2",
        )
        .bind(module)
        .bind(migration.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(MigrationError::Ledger)?;

        if applied.is_some() {
            tracing::debug!(target: "bookshelf-db", %module, id = migration.id, "migration already applied");
            report.skipped += 1;
            continue;
        }

        apply(conn, module, migration)
            .await
            .map_err(|source| MigrationError::Apply {
                module: module.clone(),
                id: migration.id,
                source,
            })?;

        tracing::info!(target: "bookshelf-db", %module, id = migration.id, "migration applied");
        report.applied += 1;
    }

    Ok(report)
}

async fn apply(
    conn: &mut PgConnection,
    module: &str,
    migration: &Migration,
) -> Result<(), sqlx::Error> {
    let mut tx = conn.begin().await?;

    sqlx::raw_sql(migration.up).execute(&mut *tx).await?;
    sqlx::query("INSERT INTO _bookshelf_migrations (module, id) VALUES ($1, $2)")
        .bind(module)
        .bind(migration.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_ddl_is_idempotent() {
        assert!(LEDGER_DDL.contains("CREATE TABLE IF NOT EXISTS"));
        assert!(LEDGER_DDL.contains(LEDGER_TABLE));
    }

    #[test]
    fn apply_error_names_migration() {
        let err = MigrationError::Apply {
            module: "books".into(),
            id: "001_init",
            source: sqlx::Error::RowNotFound,
        };
        assert_eq!(err.to_string(), "migration 'books/001_init' failed");
    }
}
