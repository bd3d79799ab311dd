//! Relational data model for a clinic: accounts, patients, doctors,
//! appointments, clinical records, billing, inventory and notifications,
//! stored in PostgreSQL through Diesel.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod relations;
pub mod schema;
pub mod service;

pub use config::{ConfigError, DatabaseConfig};
pub use db::{DbConnection, DbPool};
pub use error::ClinicError;
