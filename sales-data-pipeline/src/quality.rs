//! Output validation and data-quality profiling
//!
//! Profiling classifies columns by the batch's own schema, so columns the
//! output schema does not know about are profiled too.

use std::cmp::Ordering;
use std::collections::HashMap;

use sales_data_core::{validate, Column, ColumnData, LazyDataset, RecordBatch, Schema, Value};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::Result;

/// Descriptive statistics of one batch, each serialized as a JSON string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DqMetrics {
    /// Value-frequency table per string column
    pub categorical_stats: String,

    /// `{max, min}` per numeric column
    pub numeric_stats: String,

    /// Null count per column
    pub null_count: String,
}

impl DqMetrics {
    /// Profile every column of `batch`
    pub fn compute(batch: &RecordBatch) -> Self {
        let mut categorical = Map::new();
        let mut numeric = Map::new();
        let mut nulls = Vec::with_capacity(batch.num_columns());

        for column in batch.columns() {
            if let ColumnData::String(values) = column.data() {
                categorical.insert(column.name().to_string(), frequencies(column.name(), values));
            } else if column.data_type().is_numeric() {
                numeric.insert(column.name().to_string(), extremes(column));
            }
            nulls.push(json!({"column": column.name(), "null_count": column.null_count()}));
        }

        tracing::info!(columns = ?categorical.keys().collect::<Vec<_>>(), "categorical columns");
        tracing::info!(columns = ?numeric.keys().collect::<Vec<_>>(), "numeric columns");

        Self {
            categorical_stats: JsonValue::Object(categorical).to_string(),
            numeric_stats: JsonValue::Object(numeric).to_string(),
            null_count: JsonValue::Array(nulls).to_string(),
        }
    }

    /// The metrics as a one-row batch
    pub fn to_batch(&self) -> Result<RecordBatch> {
        let column = |name: &str, value: &str| {
            Column::constant(name, &Value::String(value.to_string()), 1)
        };
        Ok(RecordBatch::from_columns(vec![
            column("categorical_stats", &self.categorical_stats),
            column("numeric_stats", &self.numeric_stats),
            column("null_count", &self.null_count),
        ])?)
    }
}

/// Counts per distinct value, most frequent first, ties by value
///
/// Each entry is nested under the column name:
/// `[{"<col>": {"<col>": <value>, "count": <n>}}, ...]`.
fn frequencies(name: &str, values: &[Option<String>]) -> JsonValue {
    let mut counts: HashMap<Option<&str>, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_deref()).or_default() += 1;
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));

    counts
        .into_iter()
        .map(|(value, count)| {
            let mut entry = Map::new();
            entry.insert(name.to_string(), value.map_or(JsonValue::Null, JsonValue::from));
            entry.insert("count".to_string(), JsonValue::from(count));
            let mut nested = Map::new();
            nested.insert(name.to_string(), JsonValue::Object(entry));
            JsonValue::Object(nested)
        })
        .collect()
}

/// `[{"<col>_max": .., "<col>_min": ..}]`, null when the column holds no values
fn extremes(column: &Column) -> JsonValue {
    let mut max: Option<Value> = None;
    let mut min: Option<Value> = None;
    for value in column.values().filter(|v| !v.is_null()) {
        if max.as_ref().map_or(true, |m| value.partial_cmp_value(m) == Some(Ordering::Greater)) {
            max = Some(value.clone());
        }
        if min.as_ref().map_or(true, |m| value.partial_cmp_value(m) == Some(Ordering::Less)) {
            min = Some(value);
        }
    }

    let to_json = |v: Option<Value>| v.map_or(JsonValue::Null, |v| v.to_json());
    let mut entry = Map::new();
    entry.insert(format!("{}_max", column.name()), to_json(max));
    entry.insert(format!("{}_min", column.name()), to_json(min));
    JsonValue::Array(vec![JsonValue::Object(entry)])
}

/// Outcome of validating the transformed dataset
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Whether the batch satisfied the output schema
    pub passed: bool,

    /// The materialized batch
    pub batch: RecordBatch,

    /// Profile of the batch, computed whether or not it passed
    pub metrics: DqMetrics,
}

/// Materialize `dataset`, check it against `schema` and profile it
///
/// A schema violation is logged and reported as `passed = false`; only a
/// failure to materialize the dataset is returned as an error.
pub fn validate_dataset(dataset: &LazyDataset, schema: &Schema) -> Result<ValidationReport> {
    let batch = dataset.collect()?;
    tracing::info!(rows = batch.num_rows(), "processed data");
    tracing::debug!("processed data\n{batch}");

    let passed = match validate(schema, &batch) {
        Ok(()) => {
            tracing::info!("data validation was successful");
            true
        }
        Err(errors) => {
            tracing::error!("{errors}");
            false
        }
    };

    let metrics = DqMetrics::compute(&batch);
    Ok(ValidationReport { passed, batch, metrics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_data_core::{Check, DataType, Field};

    fn column(name: &str, values: &[Option<&str>]) -> Column {
        Column::new(
            name,
            ColumnData::String(values.iter().map(|v| v.map(ToString::to_string)).collect()),
        )
    }

    fn batch() -> RecordBatch {
        RecordBatch::from_columns(vec![
            column("country", &[Some("UK"), Some("India"), Some("UK"), None, Some("Canada")]),
            Column::new(
                "boxes_shipped",
                ColumnData::Int64(vec![Some(4), Some(1500), None, Some(9), Some(7)]),
            ),
            Column::new("amount", ColumnData::Float64(vec![None; 5])),
        ])
        .unwrap()
    }

    fn parse(text: &str) -> JsonValue {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_categorical_stats_sorted_by_count_then_value() {
        let metrics = DqMetrics::compute(&batch());

        assert_eq!(
            parse(&metrics.categorical_stats),
            json!({"country": [
                {"country": {"country": "UK", "count": 2}},
                {"country": {"country": null, "count": 1}},
                {"country": {"country": "Canada", "count": 1}},
                {"country": {"country": "India", "count": 1}},
            ]})
        );
    }

    #[test]
    fn test_numeric_stats_skip_nulls() {
        let metrics = DqMetrics::compute(&batch());

        assert_eq!(
            parse(&metrics.numeric_stats),
            json!({
                "boxes_shipped": [{"boxes_shipped_max": 1500, "boxes_shipped_min": 4}],
                "amount": [{"amount_max": null, "amount_min": null}],
            })
        );
    }

    #[test]
    fn test_null_count_in_schema_order() {
        let metrics = DqMetrics::compute(&batch());

        assert_eq!(
            parse(&metrics.null_count),
            json!([
                {"column": "country", "null_count": 1},
                {"column": "boxes_shipped", "null_count": 1},
                {"column": "amount", "null_count": 5},
            ])
        );
    }

    #[test]
    fn test_failed_validation_still_profiles() {
        let schema = Schema::named("limits", vec![
            Field::new("boxes_shipped", DataType::Int64, true)
                .with_check(Check::LessOrEqual(Value::Int64(1000))),
        ]);

        let report = validate_dataset(&LazyDataset::from_batch(batch()), &schema).unwrap();
        assert!(!report.passed);
        assert_eq!(report.batch.num_rows(), 5);
        assert!(parse(&report.metrics.numeric_stats)["boxes_shipped"].is_array());
    }

    #[test]
    fn test_metrics_batch_has_one_row() {
        let metrics_batch = DqMetrics::compute(&batch()).to_batch().unwrap();
        assert_eq!(metrics_batch.num_rows(), 1);
        assert_eq!(
            metrics_batch.schema().names(),
            vec!["categorical_stats", "numeric_stats", "null_count"]
        );
    }
}
