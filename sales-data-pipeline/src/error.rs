//! Error types for pipeline runs

use sales_data_core::SchemaErrors;
use thiserror::Error;

/// Error type for one pipeline run and for process setup
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The locator's extension is not a supported format
    #[error("Unsupported format '{extension}' for {locator}")]
    UnsupportedFormat {
        /// Locator as given
        locator: String,
        /// Extension that was found, possibly empty
        extension: String,
    },

    /// The raw batch failed the input schema
    #[error("Input schema violation: {0}")]
    InputSchemaViolation(SchemaErrors),

    /// The resource behind a locator could not be retrieved
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Loading or parsing the source failed
    #[error("Read error: {0}")]
    Read(sales_data_readers::Error),

    /// A transform or dataset stage failed
    #[error("Transform error: {0}")]
    Transform(#[from] sales_data_core::Error),

    /// Appending to the store failed
    #[error("Store write failure on table '{table}': {source}")]
    StoreWriteFailure {
        /// Destination table
        table: String,
        /// Underlying store error
        source: sales_data_store::Error,
    },

    /// I/O error outside of a single source read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reader errors are classified into the run-level taxonomy
impl From<sales_data_readers::Error> for PipelineError {
    fn from(error: sales_data_readers::Error) -> Self {
        match error {
            sales_data_readers::Error::UnsupportedFormat { locator, extension } => {
                PipelineError::UnsupportedFormat { locator, extension }
            }
            sales_data_readers::Error::SourceUnavailable(detail) => {
                PipelineError::SourceUnavailable(detail)
            }
            other => PipelineError::Read(other),
        }
    }
}

/// Result type for pipeline runs
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_errors_map_to_run_taxonomy() {
        let unsupported = sales_data_readers::Error::UnsupportedFormat {
            locator: "a.xlsx".into(),
            extension: "xlsx".into(),
        };
        assert!(matches!(
            PipelineError::from(unsupported),
            PipelineError::UnsupportedFormat { extension, .. } if extension == "xlsx"
        ));

        let missing = sales_data_readers::Error::SourceUnavailable("gone".into());
        assert!(matches!(PipelineError::from(missing), PipelineError::SourceUnavailable(_)));

        let format = sales_data_readers::Error::Format("empty header".into());
        assert!(matches!(PipelineError::from(format), PipelineError::Read(_)));
    }
}
