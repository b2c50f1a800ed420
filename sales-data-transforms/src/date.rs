//! Parsing a text date column into a calendar date column

use std::sync::Arc;

use chrono::NaiveDate;
use sales_data_core::{
    Column, ColumnData, DataType, Error, Field, RecordBatch, RecordBatchTransform, Result, Schema,
};

/// Day, abbreviated month, two digit year, e.g. `05-Sep-23`
pub const SALE_DATE_FORMAT: &str = "%d-%b-%y";

/// Parses `column` with a fixed format into a new `target` date column and drops `column`
#[derive(Debug, Clone)]
pub struct ParseDate {
    column: String,
    target: String,
    format: String,
}

impl ParseDate {
    /// Parse `column` with `format` into `target`
    pub fn new(column: &str, target: &str, format: &str) -> Self {
        Self {
            column: column.to_string(),
            target: target.to_string(),
            format: format.to_string(),
        }
    }
}

impl Default for ParseDate {
    fn default() -> Self {
        Self::new("date", "sale_date", SALE_DATE_FORMAT)
    }
}

impl RecordBatchTransform for ParseDate {
    fn name(&self) -> &str {
        "parse_date"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let values = batch
            .column_by_name(&self.column)?
            .as_strings()
            .ok_or_else(|| {
                Error::TypeMismatch(format!("column '{}' must be String", self.column))
            })?;

        let dates = values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .as_deref()
                    .map(|text| {
                        NaiveDate::parse_from_str(text, &self.format).map_err(|e| {
                            Error::TransformationError(format!(
                                "row {row}: cannot parse '{text}' in column '{}' as {}: {e}",
                                self.column, self.format
                            ))
                        })
                    })
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;

        batch
            .with_column(Column::new(&self.target, ColumnData::Date(dates)))?
            .drop_columns(&[self.column.as_str()])
    }

    fn output_schema(&self, input_schema: &Schema) -> Result<Arc<Schema>> {
        input_schema.index_of(&self.column)?;

        let mut fields: Vec<Field> = input_schema
            .fields()
            .iter()
            .filter(|f| f.name() != self.column && f.name() != self.target)
            .cloned()
            .collect();
        fields.push(Field::new(&self.target, DataType::Date, false));
        Ok(Arc::new(Schema::new(fields)))
    }
}
