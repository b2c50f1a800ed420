//! Coercing a currency text column to a float column

use std::sync::Arc;

use sales_data_core::{
    Column, ColumnData, DataType, Error, Field, RecordBatch, RecordBatchTransform, Result, Schema,
};

/// Strips every non-digit character from a string column and casts it to `Float64`
///
/// The decimal point is stripped too, so `"$1,234.00"` becomes `123400.0`.
/// A value left with no digits becomes null.
#[derive(Debug, Clone)]
pub struct CoerceAmount {
    column: String,
}

impl CoerceAmount {
    /// Coerce `column` in place
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}

impl Default for CoerceAmount {
    fn default() -> Self {
        Self::new("amount")
    }
}

/// Keep only ASCII digits of `text` and read them as a float
pub fn digits_to_f64(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

impl RecordBatchTransform for CoerceAmount {
    fn name(&self) -> &str {
        "coerce_amount"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let values = batch
            .column_by_name(&self.column)?
            .as_strings()
            .ok_or_else(|| {
                Error::TypeMismatch(format!("column '{}' must be String", self.column))
            })?;

        let amounts = values
            .iter()
            .map(|value| value.as_deref().and_then(digits_to_f64))
            .collect();

        batch.with_column(Column::new(&self.column, ColumnData::Float64(amounts)))
    }

    fn output_schema(&self, input_schema: &Schema) -> Result<Arc<Schema>> {
        let index = input_schema.index_of(&self.column)?;

        let mut fields = input_schema.fields().to_vec();
        fields[index] = Field::new(&self.column, DataType::Float64, false);
        Ok(Arc::new(Schema::new(fields)))
    }
}
