//! Error taxonomy shared across the CoinMatch backend
//!
//! Services return these directly; the HTTP layer maps `NotFound` and
//! `InvalidInput` to 404/400 and everything else to 500.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A referenced record (museum coin, candidate listing, ...) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected caller input: unrecognized decision string, malformed feed payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SQLite query or pool failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure while creating or opening the database path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure with no caller-actionable category (feed fetch, serialization)
    #[error("Internal error: {0}")]
    Internal(String),
}
