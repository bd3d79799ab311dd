use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use clinicdb::{DatabaseConfig, db};

/// Provisions and migrates the clinic database named by DATABASE_URL.
#[derive(Debug, Parser)]
#[command(name = "clinicdb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply all pending migrations
    Migrate,
    /// Roll back the most recently applied migration
    Revert,
    /// List migrations that have not been applied yet
    Pending,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = DatabaseConfig::from_env().context("database configuration")?;
    let pool = db::build_pool(&config).context("creating connection pool")?;
    let mut conn = pool.get().context("checking out a connection")?;

    match cli.command {
        Command::Migrate => {
            let applied = db::run_migrations(&mut *conn)?;
            info!("{} migration(s) applied", applied.len());
        }
        Command::Revert => {
            db::revert_last_migration(&mut *conn)?;
        }
        Command::Pending => {
            let pending = db::pending_migrations(&mut *conn)?;
            if pending.is_empty() {
                info!("no pending migrations");
            }
            for name in pending {
                println!("{name}");
            }
        }
    }
    Ok(())
}
