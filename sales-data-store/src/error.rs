//! Error types for the record store

use thiserror::Error;

/// Error type for store operations
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] sales_data_core::Error),

    /// I/O error while preparing the database file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQL error
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// A table or column name is not a plain SQL identifier
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// The batch already carries the id column the store assigns
    #[error("Batch already has an '{0}' column")]
    ReservedColumn(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;
