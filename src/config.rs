use std::env;

use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const POOL_SIZE_VAR: &str = "DATABASE_POOL_SIZE";
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is malformed: {reason}")]
    Malformed { var: &'static str, reason: String },
}

/// Connection settings for the clinic database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    /// Reads the settings from the process environment, loading a `.env`
    /// file first when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let database_url = validate_url(database_url.trim())?;

        let pool_size = match lookup(POOL_SIZE_VAR) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Malformed {
                        var: POOL_SIZE_VAR,
                        reason: format!("expected a positive integer, got {raw:?}"),
                    });
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        Ok(DatabaseConfig {
            database_url,
            pool_size,
        })
    }

    /// The connection string with any password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.database_url.split_once("://") else {
            return self.database_url.clone();
        };
        match rest.rsplit_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:***@{host}")
            }
            None => self.database_url.clone(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("database_url", &self.redacted_url())
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Accepts `postgres://` and `postgresql://` URLs. An empty host is allowed
/// when a database is named, which libpq resolves to the local socket
/// (`postgresql:///clinic?host=/var/run/postgresql`).
fn validate_url(url: &str) -> Result<String, ConfigError> {
    let malformed = |reason: &str| ConfigError::Malformed {
        var: DATABASE_URL_VAR,
        reason: reason.to_owned(),
    };
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| malformed("missing scheme"))?;
    if scheme != "postgres" && scheme != "postgresql" {
        return Err(malformed("scheme must be postgres:// or postgresql://"));
    }
    let location = rest.rsplit_once('@').map_or(rest, |(_, location)| location);
    let (host, database) = location.split_once('/').unwrap_or((location, ""));
    let database = database.split('?').next().unwrap_or_default();
    if host.is_empty() && database.is_empty() {
        return Err(malformed("missing host"));
    }
    Ok(url.to_owned())
}
