//! Lazy, staged datasets
//!
//! A [`LazyDataset`] pairs a [`SourceFactory`] with an ordered list of
//! [`RecordBatchTransform`] stages. Adding a stage only records it; no rows are
//! read or computed until [`LazyDataset::collect`] is called, at which point
//! the source is scanned once and every stage runs in order.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::record_batch::RecordBatch;
use crate::schema::Schema;
use crate::source::{InMemorySourceFactory, SourceFactory};
use crate::transform::{RecordBatchTransform, TransformChain};

/// Default number of rows requested from the source per read
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// A dataset whose transformations are recorded and executed on materialization
#[derive(Clone)]
pub struct LazyDataset {
    /// Factory for the underlying rows
    factory: Arc<dyn SourceFactory>,

    /// Stages applied on materialization, in order
    stages: TransformChain,

    /// Rows requested from the source per read
    batch_size: usize,
}

impl LazyDataset {
    /// Create a lazy dataset over a source factory
    pub fn new(factory: Arc<dyn SourceFactory>) -> Self {
        Self {
            factory,
            stages: TransformChain::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Create a lazy dataset over an already loaded batch
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self::new(Arc::new(InMemorySourceFactory::new(batch)))
    }

    /// Record a new stage, returning the extended dataset
    #[must_use]
    pub fn then<T: RecordBatchTransform + 'static>(mut self, stage: T) -> Self {
        self.stages = self.stages.then(stage);
        self
    }

    /// Record every stage of a chain, returning the extended dataset
    #[must_use]
    pub fn then_all(mut self, chain: &TransformChain) -> Self {
        let mut stages = self.stages.transforms().to_vec();
        stages.extend(chain.transforms().iter().cloned());
        self.stages = TransformChain::new(stages);
        self
    }

    /// Names of the recorded stages, in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.transforms().iter().map(|s| s.name()).collect()
    }

    /// Schema the dataset will have once every stage has run
    ///
    /// Derived from the stages' declared output schemas without reading any rows.
    pub fn schema(&self) -> Result<Arc<Schema>> {
        self.stages.output_schema(&self.factory.schema())
    }

    /// Scan the source once and run every recorded stage
    pub fn collect(&self) -> Result<RecordBatch> {
        let schema = self.factory.schema();
        let mut source = self.factory.create()?;

        let mut batches = Vec::new();
        while let Some(batch) = source.next_batch(self.batch_size)? {
            batches.push(batch);
        }
        let input = RecordBatch::concat(schema, &batches)?;
        tracing::debug!(
            rows = input.num_rows(),
            stages = self.stages.len(),
            "materializing dataset"
        );

        self.stages.transform(input)
    }
}

impl fmt::Debug for LazyDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyDataset")
            .field("stages", &self.stages)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}
