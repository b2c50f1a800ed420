//! Appending stamped batches to the store

use sales_data_core::{Column, RecordBatch};
use sales_data_store::{AppendSummary, Store};

use crate::error::{PipelineError, Result};
use crate::metadata::RunMetadata;

/// Add the run's provenance columns after the batch's own columns
pub fn stamp(batch: RecordBatch, run: &RunMetadata) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    run.stamp()
        .into_iter()
        .try_fold(batch, |batch, (name, value)| {
            batch.with_column(Column::constant(name, &value, rows))
        })
        .map_err(PipelineError::from)
}

/// Writes run output into append-only tables
#[derive(Debug, Clone)]
pub struct Persister {
    store: Store,
}

impl Persister {
    /// Create a persister writing to `store`
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Stamp `batch` with `run` and append it to `table`
    ///
    /// Ids continue from the table's current row count. A store error is
    /// logged and returned as [`PipelineError::StoreWriteFailure`].
    pub async fn save(
        &self,
        batch: RecordBatch,
        run: &RunMetadata,
        table: &str,
    ) -> Result<AppendSummary> {
        let stamped = stamp(batch, run)?;
        tracing::info!(run_id = %run.run_id, table, rows = stamped.num_rows(), "saving data");

        match self.store.append(table, &stamped).await {
            Ok(summary) => {
                tracing::info!(
                    run_id = %run.run_id,
                    table,
                    first_id = summary.first_id,
                    rows = summary.rows,
                    "data saved"
                );
                Ok(summary)
            }
            Err(source) => {
                tracing::error!(
                    run_id = %run.run_id,
                    table,
                    error = %source,
                    "failed to save data"
                );
                Err(PipelineError::StoreWriteFailure {
                    table: table.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_data_core::{ColumnData, Value};
    use sales_data_readers::{FileFormat, Locator};
    use sales_data_store::PageQuery;

    fn batch(rows: i64) -> RecordBatch {
        RecordBatch::from_columns(vec![Column::new(
            "boxes_shipped",
            ColumnData::Int64((1..=rows).map(Some).collect()),
        )])
        .unwrap()
    }

    fn all() -> PageQuery {
        PageQuery {
            start: "0000".into(),
            end: "9999".into(),
            cursor: 0,
            limit: 100,
        }
    }

    #[test]
    fn test_stamp_appends_constant_columns() {
        let run = RunMetadata::start(&Locator::new("data/sales.csv"), FileFormat::Csv);
        let stamped = stamp(batch(3), &run).unwrap();

        assert_eq!(
            stamped.schema().names(),
            vec![
                "boxes_shipped",
                "run_id",
                "file_name",
                "file_type",
                "source",
                "created_at",
                "modified_at"
            ]
        );
        let run_ids = stamped.column_by_name("run_id").unwrap();
        assert!(run_ids.values().all(|v| v == Value::String(run.run_id.clone())));
    }

    #[tokio::test]
    async fn test_ids_continue_across_saves() {
        let dir = tempfile::tempdir().unwrap();
        let persister = Persister::new(Store::new(dir.path().join("db").join("pipeline.db")));
        let run = RunMetadata::start(&Locator::new("data/sales.csv"), FileFormat::Csv);

        let first = persister.save(batch(3), &run, "sales").await.unwrap();
        let second = persister.save(batch(2), &run, "sales").await.unwrap();
        assert_eq!((first.first_id, second.first_id), (1, 4));

        let rows = persister.store().query_page("sales", &all()).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(rows[0]["file_name"], "sales");
        assert_eq!(rows[0]["created_at"], run.timestamp());
    }

    #[tokio::test]
    async fn test_store_errors_are_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let persister = Persister::new(Store::new(dir.path().join("pipeline.db")));
        let run = RunMetadata::start(&Locator::new("data/sales.csv"), FileFormat::Csv);

        let err = persister.save(batch(1), &run, "not a table").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StoreWriteFailure { table, .. } if table == "not a table"
        ));
    }
}
