//! Error types for data readers

use thiserror::Error;

/// Error type for data readers
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] sales_data_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV format error
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON format error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The locator's extension is not a supported format
    #[error("Unsupported format '{extension}' for {locator}")]
    UnsupportedFormat {
        /// Locator as given
        locator: String,
        /// Extension that was found, possibly empty
        extension: String,
    },

    /// The resource behind a locator could not be retrieved
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Format error
    #[error("Format error: {0}")]
    Format(String),
}

/// Result type for data readers
pub type Result<T> = std::result::Result<T, Error>;
