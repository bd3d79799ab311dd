use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the data-access and service layers.
///
/// Constraint violations raised by Postgres are lifted out of
/// `diesel::result::Error` so callers can match on them directly.
#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not connect to the database: {0}")]
    Connection(#[from] diesel::result::ConnectionError),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("migration failed: {0}")]
    Migration(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("uniqueness violation on {}", constraint.as_deref().unwrap_or("unknown constraint"))]
    UniqueViolation { constraint: Option<String> },

    #[error("foreign key violation on {}", constraint.as_deref().unwrap_or("unknown constraint"))]
    ForeignKeyViolation { constraint: Option<String> },

    #[error("not-null violation: {message}")]
    NotNullViolation { message: String },

    #[error("check violation on {}", constraint.as_deref().unwrap_or("unknown constraint"))]
    CheckViolation { constraint: Option<String> },

    #[error("serialization failure, the transaction may be retried")]
    SerializationFailure,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("payment of {attempted} would exceed invoice {invoice_id} total {amount} (already paid {paid})")]
    Overpayment {
        invoice_id: i32,
        amount: Decimal,
        paid: Decimal,
        attempted: Decimal,
    },

    #[error("inventory item {item_id} has {available} in stock, cannot remove {requested}")]
    InsufficientStock {
        item_id: i32,
        available: i32,
        requested: i32,
    },

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(DieselError),
}

impl ClinicError {
    /// True for failures a caller may resolve by re-running the whole
    /// transaction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClinicError::SerializationFailure)
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ClinicError::Validation(msg.into())
    }
}

impl From<DieselError> for ClinicError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, info) => {
                let constraint = info.constraint_name().map(str::to_owned);
                match kind {
                    DatabaseErrorKind::UniqueViolation => ClinicError::UniqueViolation { constraint },
                    DatabaseErrorKind::ForeignKeyViolation => {
                        ClinicError::ForeignKeyViolation { constraint }
                    }
                    DatabaseErrorKind::NotNullViolation => ClinicError::NotNullViolation {
                        message: info.message().to_owned(),
                    },
                    DatabaseErrorKind::CheckViolation => ClinicError::CheckViolation { constraint },
                    DatabaseErrorKind::SerializationFailure => ClinicError::SerializationFailure,
                    other => ClinicError::Database(DieselError::DatabaseError(other, info)),
                }
            }
            other => ClinicError::Database(other),
        }
    }
}

impl From<argon2::password_hash::Error> for ClinicError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ClinicError::PasswordHash(err.to_string())
    }
}
