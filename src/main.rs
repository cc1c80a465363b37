//! Givebox cli

use clap::{Parser, Subcommand};
use givebox::*;
use migration::{Migrator, MigratorTrait};
use std::path::PathBuf;
use tracing::info;

/// Cli
#[derive(Debug, Parser)]
#[command(name = "givebox", about = "givebox donation server.", version)]
pub struct Cli {
    /// config file path
    #[arg(short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// run migrations and start the http server (default)
    Serve,
    /// run pending migrations only
    Migrate,
    /// fail pending donations whose callback never arrived
    ExpirePending {
        /// only orders created at least this many seconds ago, defaults to `donation.pending_expiry`
        #[arg(long, value_name = "SECS")]
        older_than: Option<u64>,
    },
    /// print donation counts per status
    Status,
}

#[actix_web::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "INFO");
    }
    // try to load config from .env
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let args = Cli::parse();
    let state: AppState = AppState::create(args.config, Some("GIVEBOX".to_string())).await?;
    Migrator::up(state.service.db(), None).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Start givebox server");
            start(state).await?;
            info!("Server shutdown");
        }
        Command::Migrate => {
            info!("Migrations applied");
        }
        Command::ExpirePending { older_than } => {
            let older_than = older_than.unwrap_or(state.setting.donation.pending_expiry);
            let updated = state.service.expire_pending(older_than).await?;
            println!("Updated {} donations from 'pending' to 'failed'.", updated);
        }
        Command::Status => {
            let count = state.service.status_count().await?;
            println!(
                "Donation Counts - Pending: {}, Failed: {}, Success: {}",
                count.pending, count.failed, count.success
            );
        }
    }
    Ok(())
}
