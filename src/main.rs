//! # CRM API Main Entry Point
//!
//! Loads configuration, runs migrations and starts the HTTP server. The
//! `migrate` subcommand applies migrations and exits.

use clap::{Parser, Subcommand};
use crm::migration::{Migrator, MigratorTrait};
use crm::{config::ConfigLoader, db, seeds, server, telemetry};

#[derive(Parser)]
#[command(name = "crm", version, about = "Multi-tenant CRM backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new().load()?;
    telemetry::init_tracing(&config)?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, "Loaded configuration: {}", redacted_json);
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            let db = db::init_pool(&config).await?;
            Migrator::up(&db, None).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::Serve => {
            config.validate()?;

            let db = db::init_pool(&config).await?;
            Migrator::up(&db, None).await?;
            seeds::seed_default_pipeline(&db).await?;

            let state = server::AppState::new(config, db)?;
            server::run_server(state).await
        }
    }
}
