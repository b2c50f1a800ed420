//! Error types for the sales data pipeline core

use thiserror::Error;

use crate::validation::SchemaErrors;

/// Result type for core pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for core pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while producing or consuming data
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index out of bounds
    #[error("Index out of bounds: {index} >= {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the indexed collection
        length: usize,
    },

    /// Column lookup failed
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Schema mismatch
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Data type mismatch
    #[error("Data type mismatch: {0}")]
    TypeMismatch(String),

    /// A batch failed validation against a schema
    #[error(transparent)]
    Validation(#[from] SchemaErrors),

    /// Transformation error
    #[error("Transformation error: {0}")]
    TransformationError(String),

    /// Source could not produce data
    #[error("Source error: {0}")]
    SourceError(String),
}
