use std::path::PathBuf;

use anyhow::Context;
use bookshelf_db::ConnectionString;
use bookshelf_kernel::settings::{Settings, DEFAULT_ENV_FILE};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Book catalogue service")]
struct Cli {
    /// Environment file loaded before reading settings
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate the database and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the resolved settings with the password masked
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_with_env_file(&cli.env_file)
        .with_context(|| "failed to load bookshelf settings")?;

    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bookshelf_app::bootstrap::serve(&settings).await,
        Command::Migrate => {
            let db = bookshelf_app::bootstrap::connect(&settings).await?;
            let registry = bookshelf_app::bootstrap::build_registry(&db);
            let report = bookshelf_app::bootstrap::migrate(&db, &registry).await?;
            println!(
                "migrations applied: {}, already applied: {}",
                report.applied, report.skipped
            );
            Ok(())
        }
        Command::CheckConfig => {
            let connection = ConnectionString::from_settings(&settings.database)
                .context("database settings do not form a connection string")?;
            println!("environment: {:?}", settings.environment);
            println!("listen:      {}", settings.server.bind_address());
            println!("database:    {}", connection.redacted());
            Ok(())
        }
    }
}
