//! The relational store as seen by the operation handlers.
//!
//! Every request opens its own connection and drops it when done. There is no
//! pool and nothing is cached between requests.

pub mod credentials;
pub mod postgres;

use async_trait::async_trait;
use std::time::Duration;

pub use credentials::{CredentialsError, ReadOnlyCredentials};
pub use postgres::PgDatabase;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("could not connect to database '{database}': {message}")]
    Connect { database: String, message: String },

    #[error("query failed: {0}")]
    Query(String),

    #[error("could not read query result: {0}")]
    Scan(String),

    #[error("could not set up TLS: {0}")]
    Tls(String),

    #[error("database {stage} timed out after {}s", .after.as_secs())]
    Timeout {
        stage: &'static str,
        after: Duration,
    },
}

#[async_trait]
pub trait Database: Send + Sync {
    /// Opens a new connection to the named database.
    async fn connect(&self, database: &str) -> Result<Box<dyn Connection>, DbError>;
}

/// A single open connection. Dropping it closes the connection.
#[async_trait]
pub trait Connection: Send {
    /// Runs `sql` and reads the first column of every returned row as an integer.
    async fn query_i64(&mut self, sql: &str) -> Result<Vec<i64>, DbError>;
}
