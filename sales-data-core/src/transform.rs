//! Transform trait and chaining for record batch transformation

use std::sync::Arc;

use crate::error::Result;
use crate::record_batch::RecordBatch;
use crate::schema::Schema;

/// A transformation that processes record batches
pub trait RecordBatchTransform: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Transform a record batch
    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch>;

    /// Get the output schema for this transform when applied to the given input schema
    fn output_schema(&self, input_schema: &Schema) -> Result<Arc<Schema>>;
}

/// A chain of transforms that can be executed as a single transform
#[derive(Clone, Default)]
pub struct TransformChain {
    /// The transforms in this chain
    transforms: Vec<Arc<dyn RecordBatchTransform>>,
}

impl TransformChain {
    /// Create a new transform chain
    pub fn new(transforms: Vec<Arc<dyn RecordBatchTransform>>) -> Self {
        Self { transforms }
    }

    /// Append a transform to the end of the chain
    #[must_use]
    pub fn then<T: RecordBatchTransform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// Get a reference to the transforms in this chain
    pub fn transforms(&self) -> &[Arc<dyn RecordBatchTransform>] {
        &self.transforms
    }

    /// Number of transforms in this chain
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if the chain has no transforms
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl RecordBatchTransform for TransformChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let mut current = batch;

        for transform in &self.transforms {
            current = transform.transform(current)?;
            tracing::trace!(
                stage = transform.name(),
                rows = current.num_rows(),
                "applied transform"
            );
        }

        Ok(current)
    }

    fn output_schema(&self, input_schema: &Schema) -> Result<Arc<Schema>> {
        let mut current = Arc::new(input_schema.clone());

        for transform in &self.transforms {
            current = transform.output_schema(&current)?;
        }

        Ok(current)
    }
}

impl std::fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.transforms.iter().map(|t| t.name()))
            .finish()
    }
}
