use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{info, warn};

use crate::config::DatabaseConfig;
use crate::error::ClinicError;

// Database connection pool type
pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn build_pool(config: &DatabaseConfig) -> Result<DbPool, ClinicError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .build(manager)?;
    info!(
        "connection pool ready for {} ({} connections)",
        config.redacted_url(),
        config.pool_size
    );
    Ok(pool)
}

pub fn establish(config: &DatabaseConfig) -> Result<PgConnection, ClinicError> {
    Ok(PgConnection::establish(&config.database_url)?)
}

/// Applies every pending migration and returns the applied versions.
///
/// Failures are reported as-is; a half-applied schema change needs an
/// operator, so nothing here retries.
pub fn run_migrations<C>(conn: &mut C) -> Result<Vec<String>, ClinicError>
where
    C: MigrationHarness<Pg>,
{
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(ClinicError::Migration)?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    if applied.is_empty() {
        info!("schema is up to date");
    }
    for version in &applied {
        info!("applied migration {version}");
    }
    Ok(applied)
}

pub fn revert_last_migration<C>(conn: &mut C) -> Result<String, ClinicError>
where
    C: MigrationHarness<Pg>,
{
    let version = conn
        .revert_last_migration(MIGRATIONS)
        .map_err(ClinicError::Migration)?
        .to_string();
    warn!("reverted migration {version}");
    Ok(version)
}

pub fn pending_migrations<C>(conn: &mut C) -> Result<Vec<String>, ClinicError>
where
    C: MigrationHarness<Pg>,
{
    Ok(conn
        .pending_migrations(MIGRATIONS)
        .map_err(ClinicError::Migration)?
        .iter()
        .map(|migration| migration.name().to_string())
        .collect())
}
