//! Source traits and an in-memory implementation for data input

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record_batch::RecordBatch;
use crate::schema::Schema;

/// A record batch source for the pipeline
pub trait RecordBatchSource: Send {
    /// Get the schema of this source
    fn schema(&self) -> Arc<Schema>;

    /// Retrieve the next batch of records from this source
    /// Returns None when exhausted
    fn next_batch(&mut self, max_batch_size: usize) -> Result<Option<RecordBatch>>;

    /// Provides a hint about the total number of rows (if known)
    fn row_count_hint(&self) -> Option<usize> {
        None
    }

    /// Reset the source to start reading from the beginning
    fn reset(&mut self) -> Result<()>;
}

/// A factory for creating fresh sources over the same data
///
/// A lazy dataset holds a factory rather than a source so that it can be
/// materialized more than once.
pub trait SourceFactory: Send + Sync {
    /// Schema of every source this factory creates
    fn schema(&self) -> Arc<Schema>;

    /// Create a new source positioned at the first row
    fn create(&self) -> Result<Box<dyn RecordBatchSource>>;
}

/// A source replaying one in-memory record batch in slices
#[derive(Debug, Clone)]
pub struct InMemorySource {
    /// The batch being replayed
    batch: RecordBatch,

    /// Next row to hand out
    position: usize,
}

impl InMemorySource {
    /// Create a source over the given batch
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch, position: 0 }
    }
}

impl RecordBatchSource for InMemorySource {
    fn schema(&self) -> Arc<Schema> {
        self.batch.schema().clone()
    }

    fn next_batch(&mut self, max_batch_size: usize) -> Result<Option<RecordBatch>> {
        if max_batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be positive".into()));
        }
        if self.position >= self.batch.num_rows() {
            return Ok(None);
        }

        let length = max_batch_size.min(self.batch.num_rows() - self.position);
        let slice = self.batch.slice(self.position, length)?;
        self.position += length;
        Ok(Some(slice))
    }

    fn row_count_hint(&self) -> Option<usize> {
        Some(self.batch.num_rows())
    }

    fn reset(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }
}

/// Factory handing out [`InMemorySource`]s over a shared batch
#[derive(Debug, Clone)]
pub struct InMemorySourceFactory {
    batch: RecordBatch,
}

impl InMemorySourceFactory {
    /// Create a factory over the given batch
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }
}

impl SourceFactory for InMemorySourceFactory {
    fn schema(&self) -> Arc<Schema> {
        self.batch.schema().clone()
    }

    fn create(&self) -> Result<Box<dyn RecordBatchSource>> {
        Ok(Box::new(InMemorySource::new(self.batch.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, ColumnData};

    fn batch(rows: i64) -> RecordBatch {
        RecordBatch::from_columns(vec![Column::new(
            "n",
            ColumnData::Int64((0..rows).map(Some).collect()),
        )])
        .unwrap()
    }

    #[test]
    fn test_in_memory_source_slices_and_resets() {
        let mut source = InMemorySource::new(batch(5));
        assert_eq!(source.row_count_hint(), Some(5));

        let sizes: Vec<usize> = std::iter::from_fn(|| source.next_batch(2).unwrap())
            .map(|b| b.num_rows())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert!(source.next_batch(2).unwrap().is_none());

        source.reset().unwrap();
        assert_eq!(source.next_batch(10).unwrap().unwrap().num_rows(), 5);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let mut source = InMemorySource::new(batch(1));
        assert!(source.next_batch(0).is_err());
    }

    #[test]
    fn test_factory_creates_independent_sources() {
        let factory = InMemorySourceFactory::new(batch(3));
        let mut first = factory.create().unwrap();
        first.next_batch(3).unwrap();

        let mut second = factory.create().unwrap();
        assert_eq!(second.next_batch(3).unwrap().unwrap().num_rows(), 3);
    }
}
