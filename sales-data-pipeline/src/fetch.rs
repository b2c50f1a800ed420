//! Source fetching: locator to input-validated dataset

use std::sync::Arc;

use sales_data_core::{Error as CoreError, LazyDataset, Schema, ValidateStage};
use sales_data_readers::{read_batch, Loader, Locator, NormalizeColumnNames};

use crate::error::{PipelineError, Result};
use crate::metadata::RunMetadata;

/// Resolves locators into datasets that satisfy the input schema
#[derive(Debug, Clone)]
pub struct Fetcher {
    loader: Loader,
    input_schema: Arc<Schema>,
}

impl Fetcher {
    /// Create a fetcher checking against `input_schema`
    pub fn new(loader: Loader, input_schema: Arc<Schema>) -> Self {
        Self { loader, input_schema }
    }

    /// Load `locator`, normalize its column names and validate it
    ///
    /// Fails with [`PipelineError::UnsupportedFormat`] before any read when the
    /// extension is not supported, and with
    /// [`PipelineError::InputSchemaViolation`] carrying every violation when
    /// the loaded batch does not satisfy the input schema.
    pub async fn fetch(&self, locator: &Locator) -> Result<(LazyDataset, RunMetadata)> {
        let format = locator.format().map_err(|e| {
            tracing::error!(
                %locator,
                error = %e,
                "format not supported, supported formats are csv and json"
            );
            PipelineError::from(e)
        })?;
        let run = RunMetadata::start(locator, format);
        tracing::info!(run_id = %run.run_id, %locator, file_type = %format, "reading data");

        let bytes = self.loader.load(locator).await?;
        let batch = read_batch(&bytes, format)?;

        let staged = LazyDataset::from_batch(batch)
            .then(NormalizeColumnNames)
            .then(ValidateStage::new(Arc::clone(&self.input_schema)));
        let validated = match staged.collect() {
            Ok(batch) => batch,
            Err(CoreError::Validation(errors)) => {
                tracing::error!(run_id = %run.run_id, %locator, "{errors}");
                return Err(PipelineError::InputSchemaViolation(errors));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(run_id = %run.run_id, rows = validated.num_rows(), "input data validated");
        tracing::debug!("input data\n{validated}");

        Ok((LazyDataset::from_batch(validated), run))
    }
}
