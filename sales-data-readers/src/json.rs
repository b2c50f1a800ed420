//! JSON reader for record-oriented and column-oriented documents
//!
//! Two layouts are accepted:
//!
//! * an array of objects, one per record: `[{"a": 1, "b": "x"}, ...]`
//! * an object of columns, each either an index-keyed object or an array:
//!   `{"a": {"0": 1, "1": 2}}` or `{"a": [1, 2]}`
//!
//! Column order follows first appearance. A key missing from a record is null.

use serde_json::{Map, Value as JsonValue};
use sales_data_core::{Column, ColumnData, DataType, RecordBatch};

use crate::common::SchemaInference;
use crate::error::{Error, Result};

/// Parse a JSON document into a record batch
pub fn read_json(bytes: &[u8]) -> Result<RecordBatch> {
    let document: JsonValue = serde_json::from_slice(bytes)?;

    let columns = match document {
        JsonValue::Array(records) => from_records(records)?,
        JsonValue::Object(columns) => from_columns(columns)?,
        _ => {
            return Err(Error::Format(
                "JSON input must be an array of records or an object of columns".into(),
            ))
        }
    };

    let columns = columns
        .into_iter()
        .map(|(name, values)| build_column(&name, values))
        .collect();
    let batch = RecordBatch::from_columns(columns)?;
    tracing::debug!(rows = batch.num_rows(), columns = batch.num_columns(), "read json");
    Ok(batch)
}

fn from_records(records: Vec<JsonValue>) -> Result<Vec<(String, Vec<JsonValue>)>> {
    let mut columns: Vec<(String, Vec<JsonValue>)> = Vec::new();

    for (row, record) in records.into_iter().enumerate() {
        let JsonValue::Object(record) = record else {
            return Err(Error::Format(format!("record {row} is not a JSON object")));
        };

        for (key, value) in record {
            let position = match columns.iter().position(|(name, _)| *name == key) {
                Some(position) => position,
                None => {
                    columns.push((key, vec![JsonValue::Null; row]));
                    columns.len() - 1
                }
            };
            columns[position].1.push(value);
        }

        for (_, values) in &mut columns {
            values.resize(row + 1, JsonValue::Null);
        }
    }

    Ok(columns)
}

fn from_columns(columns: Map<String, JsonValue>) -> Result<Vec<(String, Vec<JsonValue>)>> {
    columns
        .into_iter()
        .map(|(name, values)| {
            let values = match values {
                JsonValue::Array(values) => values,
                JsonValue::Object(indexed) => {
                    let mut entries = indexed
                        .into_iter()
                        .map(|(index, value)| match index.parse::<usize>() {
                            Ok(i) => Ok((i, value)),
                            Err(_) => Err(Error::Format(format!(
                                "column '{name}' has non-numeric index '{index}'"
                            ))),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    entries.sort_by_key(|(i, _)| *i);
                    entries.into_iter().map(|(_, value)| value).collect()
                }
                _ => {
                    let detail = format!("column '{name}' is not an array or object");
                    return Err(Error::Format(detail));
                }
            };
            Ok((name, values))
        })
        .collect()
}

fn build_column(name: &str, values: Vec<JsonValue>) -> Column {
    let non_null = || values.iter().filter(|v| !v.is_null());

    let data = if non_null().all(|v| v.as_i64().is_some()) && non_null().next().is_some() {
        ColumnData::Int64(values.iter().map(JsonValue::as_i64).collect())
    } else if non_null().all(JsonValue::is_number) && non_null().next().is_some() {
        ColumnData::Float64(values.iter().map(JsonValue::as_f64).collect())
    } else if non_null().all(JsonValue::is_boolean) && non_null().next().is_some() {
        ColumnData::Boolean(values.iter().map(JsonValue::as_bool).collect())
    } else if non_null().all(JsonValue::is_string) {
        return string_column(name, values);
    } else {
        ColumnData::String(
            values
                .into_iter()
                .map(|v| match v {
                    JsonValue::Null => None,
                    JsonValue::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect(),
        )
    };

    Column::new(name, data)
}

/// Quoted numbers are typed the way CSV cells are
fn string_column(name: &str, values: Vec<JsonValue>) -> Column {
    let cells: Vec<Option<String>> = values
        .into_iter()
        .map(|v| match v {
            JsonValue::String(s) => Some(s),
            _ => None,
        })
        .collect();
    let refs: Vec<&str> = cells.iter().map(|c| c.as_deref().unwrap_or("")).collect();

    let data = match SchemaInference::infer_data_type(&refs) {
        DataType::Int64 => ColumnData::Int64(refs.iter().map(|s| s.parse().ok()).collect()),
        DataType::Float64 => ColumnData::Float64(refs.iter().map(|s| s.parse().ok()).collect()),
        _ => ColumnData::String(cells),
    };

    Column::new(name, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_data_core::Value;

    #[test]
    fn test_records_layout() {
        let batch = read_json(
            br#"[
                {"Sales Person": "John Smith", "Boxes Shipped": 42, "Amount": "$1,234.00"},
                {"Sales Person": "Ann Lee", "Boxes Shipped": 7, "Extra": 1.5}
            ]"#,
        )
        .unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(
            batch.schema().names(),
            vec!["Sales Person", "Boxes Shipped", "Amount", "Extra"]
        );
        assert_eq!(batch.column(1).unwrap().data_type(), DataType::Int64);
        assert!(batch.column(2).unwrap().is_null(1));
        assert_eq!(
            batch.column(3).unwrap().values().collect::<Vec<_>>(),
            vec![Value::Null, Value::Float64(1.5)]
        );
    }

    #[test]
    fn test_column_layouts() {
        let indexed =
            read_json(br#"{"a": {"1": "y", "0": "x"}, "b": {"0": 1, "1": 2.5}}"#).unwrap();
        assert_eq!(indexed.column(0).unwrap().value(0).unwrap(), Value::String("x".into()));
        assert_eq!(indexed.column(1).unwrap().data_type(), DataType::Float64);

        let arrays = read_json(br#"{"a": [true, null]}"#).unwrap();
        assert_eq!(arrays.column(0).unwrap().data_type(), DataType::Boolean);
        assert_eq!(arrays.column(0).unwrap().null_count(), 1);
    }

    #[test]
    fn test_mixed_values_become_strings() {
        let batch = read_json(br#"[{"a": 1}, {"a": "two"}]"#).unwrap();
        assert_eq!(batch.column(0).unwrap().values().collect::<Vec<_>>(), vec![
            Value::String("1".into()),
            Value::String("two".into()),
        ]);
    }

    #[test]
    fn test_quoted_numbers_are_typed() {
        let batch = read_json(
            br#"[
                {"Boxes Shipped": "42", "Ratio": "0.5", "Amount": "$1,234.00"},
                {"Boxes Shipped": null, "Ratio": "2", "Amount": "$7"}
            ]"#,
        )
        .unwrap();

        let boxes = batch.column(0).unwrap();
        assert_eq!(boxes.data_type(), DataType::Int64);
        assert_eq!(boxes.values().collect::<Vec<_>>(), vec![Value::Int64(42), Value::Null]);
        assert_eq!(batch.column(1).unwrap().data_type(), DataType::Float64);
        assert_eq!(batch.column(2).unwrap().data_type(), DataType::String);
    }

    #[test]
    fn test_rejects_unexpected_shapes() {
        assert!(matches!(read_json(b"42"), Err(Error::Format(_))));
        assert!(matches!(read_json(b"[1, 2]"), Err(Error::Format(_))));
        assert!(matches!(read_json(b"{not json"), Err(Error::Json(_))));
    }
}
