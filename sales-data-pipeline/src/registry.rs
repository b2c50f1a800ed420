//! Input and output contracts of a sales batch

use std::sync::Arc;

use chrono::NaiveDate;
use sales_data_core::{Check, DataType, Error, Field, Result, Schema, Value};

/// Countries a sale may be recorded against
pub const ALLOWED_COUNTRIES: [&str; 6] =
    ["Australia", "India", "USA", "UK", "Canada", "New Zealand"];

/// Pattern of the raw `date` column, e.g. `04-Jan-22`
pub const RAW_DATE_PATTERN: &str = r"\d{2}-[A-Z][a-z]{2}-\d{2}";

/// Largest `boxes_shipped` value accepted
pub const MAX_BOXES_SHIPPED: i64 = 1000;

/// Name of the raw shape
pub const INPUT_SCHEMA_NAME: &str = "sales_input";

/// Name of the cleaned shape
pub const OUTPUT_SCHEMA_NAME: &str = "sales_output";

fn country() -> Field {
    Field::new("country", DataType::String, false)
        .with_check(Check::IsIn(ALLOWED_COUNTRIES.iter().map(ToString::to_string).collect()))
}

fn boxes_shipped() -> Field {
    Field::new("boxes_shipped", DataType::Int64, false)
        .with_check(Check::LessOrEqual(Value::Int64(MAX_BOXES_SHIPPED)))
}

/// Earliest sale date accepted after parsing
pub fn earliest_sale_date() -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(2022, 1, 1)
        .ok_or_else(|| Error::InvalidArgument("2022-01-01 is not a valid date".into()))
}

/// The two schemas a run is checked against
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    input: Arc<Schema>,
    output: Arc<Schema>,
}

impl SchemaRegistry {
    /// Build both schemas
    pub fn new() -> Result<Self> {
        let input = Schema::named(INPUT_SCHEMA_NAME, vec![
            Field::new("sales_person", DataType::String, false),
            country(),
            Field::new("product", DataType::String, false),
            Field::new("date", DataType::String, false)
                .with_check(Check::str_matches(RAW_DATE_PATTERN)?),
            Field::new("amount", DataType::String, false),
            boxes_shipped(),
        ]);

        let output = Schema::named(OUTPUT_SCHEMA_NAME, vec![
            Field::new("sales_person", DataType::String, false),
            country(),
            Field::new("product", DataType::String, false),
            Field::new("sale_date", DataType::Date, false)
                .with_check(Check::GreaterOrEqual(Value::Date(earliest_sale_date()?))),
            Field::new("amount", DataType::Float64, false),
            boxes_shipped(),
            Field::new("first_name", DataType::String, false),
            Field::new("last_name", DataType::String, false),
        ]);

        Ok(Self {
            input: input.into_ref(),
            output: output.into_ref(),
        })
    }

    /// Raw shape, checked right after loading
    pub fn input(&self) -> &Arc<Schema> {
        &self.input
    }

    /// Cleaned shape, checked after the transforms
    pub fn output(&self) -> &Arc<Schema> {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_data_core::{validate, Column, ColumnData, RecordBatch};

    fn strings(name: &str, values: &[&str]) -> Column {
        let values = values.iter().map(|v| Some((*v).to_string())).collect();
        Column::new(name, ColumnData::String(values))
    }

    fn raw(country: &str, date: &str, boxes: i64) -> RecordBatch {
        RecordBatch::from_columns(vec![
            strings("sales_person", &["John Smith"]),
            strings("country", &[country]),
            strings("product", &["Mint"]),
            strings("date", &[date]),
            strings("amount", &["$1,234.00"]),
            Column::new("boxes_shipped", ColumnData::Int64(vec![Some(boxes)])),
        ])
        .unwrap()
    }

    #[test]
    fn test_input_schema_accepts_conformant_row() {
        let registry = SchemaRegistry::new().unwrap();
        assert!(validate(registry.input(), &raw("India", "05-Sep-23", 42)).is_ok());
    }

    #[test]
    fn test_input_schema_collects_every_violation() {
        let registry = SchemaRegistry::new().unwrap();
        let errors = validate(registry.input(), &raw("France", "2023-09-05", 1500)).unwrap_err();

        assert_eq!(errors.schema, INPUT_SCHEMA_NAME);
        let columns: Vec<&str> = errors.failures.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["country", "date", "boxes_shipped"]);
    }

    #[test]
    fn test_output_schema_names() {
        let registry = SchemaRegistry::new().unwrap();
        assert_eq!(registry.output().name(), Some(OUTPUT_SCHEMA_NAME));
        assert!(registry.output().contains("sale_date"));
        assert!(!registry.output().contains("date"));
        assert!(registry.output().fields().iter().all(|f| !f.is_nullable()));
    }
}
