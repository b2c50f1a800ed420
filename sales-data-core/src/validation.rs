//! Collect-all-errors schema validation
//!
//! [`validate`] runs every field of a [`Schema`] against a [`RecordBatch`] and
//! gathers each violation into a single [`SchemaErrors`] report. It never stops
//! at the first failure. Per field the order is:
//!
//! 1. the column must exist (`column_in_dataframe`)
//! 2. its type must equal the declared type (`dtype('..')`); value checks are
//!    skipped for a column of the wrong type
//! 3. non-nullable fields must hold no nulls (`not_nullable`), one case per row
//! 4. every [`Check`](crate::schema::Check) runs on every non-null value, one
//!    case per failing row
//!
//! Columns present in the batch but absent from the schema are ignored.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::record_batch::RecordBatch;
use crate::schema::Schema;
use crate::transform::RecordBatchTransform;

/// A single violated check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureCase {
    /// Column the check belongs to
    pub column: String,

    /// Name of the violated check
    pub check: String,

    /// Offending row, absent for column-level failures
    pub row: Option<usize>,

    /// Offending value, if any
    pub value: Option<serde_json::Value>,
}

impl fmt::Display for FailureCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}' failed {}", self.column, self.check)?;
        if let Some(row) = self.row {
            write!(f, " at row {row}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " (value: {value})")?;
        }
        Ok(())
    }
}

/// Every violation found while validating a batch against a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaErrors {
    /// Name of the schema that was checked
    pub schema: String,

    /// All failure cases, grouped by field in schema order
    pub failures: Vec<FailureCase>,
}

impl SchemaErrors {
    /// Number of failure cases
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no failure was recorded
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure cases recorded for one column
    pub fn for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a FailureCase> {
        self.failures.iter().filter(move |f| f.column == column)
    }
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schema '{}' failed validation with {} failure case(s)",
            self.schema,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

/// Validate `batch` against `schema`, collecting every violation
pub fn validate(schema: &Schema, batch: &RecordBatch) -> std::result::Result<(), SchemaErrors> {
    let mut failures = Vec::new();

    for field in schema.fields() {
        let Ok(column) = batch.column_by_name(field.name()) else {
            failures.push(FailureCase {
                column: field.name().to_string(),
                check: "column_in_dataframe".into(),
                row: None,
                value: None,
            });
            continue;
        };

        if column.data_type() != *field.data_type() {
            failures.push(FailureCase {
                column: field.name().to_string(),
                check: format!("dtype('{}')", field.data_type()),
                row: None,
                value: Some(serde_json::Value::String(column.data_type().to_string())),
            });
            continue;
        }

        for (row, value) in column.values().enumerate() {
            if value.is_null() {
                if !field.is_nullable() {
                    failures.push(FailureCase {
                        column: field.name().to_string(),
                        check: "not_nullable".into(),
                        row: Some(row),
                        value: None,
                    });
                }
                continue;
            }

            for check in field.checks() {
                if !check.passes(&value) {
                    failures.push(FailureCase {
                        column: field.name().to_string(),
                        check: check.name(),
                        row: Some(row),
                        value: Some(value.to_json()),
                    });
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors {
            schema: schema.name().unwrap_or("schema").to_string(),
            failures,
        })
    }
}

/// A dataset stage that passes batches through unchanged if they satisfy a schema
#[derive(Debug, Clone)]
pub struct ValidateStage {
    schema: Arc<Schema>,
}

impl ValidateStage {
    /// Create a stage validating against `schema`
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl RecordBatchTransform for ValidateStage {
    fn name(&self) -> &str {
        "validate"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        validate(&self.schema, &batch).map_err(Error::Validation)?;
        Ok(batch)
    }

    fn output_schema(&self, input_schema: &Schema) -> Result<Arc<Schema>> {
        Ok(Arc::new(input_schema.clone()))
    }
}
