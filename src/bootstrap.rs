//! Startup sequence: connect, migrate, initialize modules, serve.
//!
//! Every error returned from here is fatal; nothing is retried.

use anyhow::Context;
use bookshelf_db::{migrate::MigrationReport, Database};
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Build the registry of every module backed by `db`.
pub fn build_registry(db: &Database) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, db);
    registry
}

/// Open the shared database handle.
pub async fn connect(settings: &Settings) -> anyhow::Result<Database> {
    bookshelf_db::connect(&settings.database)
        .await
        .context("could not load database")
}

/// Apply pending module migrations.
pub async fn migrate(db: &Database, registry: &ModuleRegistry) -> anyhow::Result<MigrationReport> {
    let report = bookshelf_db::migrate::run(db, &registry.collect_migrations())
        .await
        .context("could not migrate database")?;

    tracing::info!(
        applied = report.applied,
        skipped = report.skipped,
        "database migrations complete"
    );
    Ok(report)
}

/// Connect, migrate, and initialize modules, returning the ready registry.
pub async fn prepare(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let db = connect(settings).await?;
    let registry = build_registry(&db);

    migrate(&db, &registry).await?;

    let ctx = InitCtx { settings };
    registry.init_modules(&ctx).await?;

    Ok(registry)
}

/// Run the service until the listener fails.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let registry = prepare(settings).await?;

    tracing::info!("bookshelf bootstrap complete");
    bookshelf_http::start_server(&registry, settings).await
}
