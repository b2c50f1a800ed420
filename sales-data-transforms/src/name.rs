//! Splitting a full name column into first and last name

use std::sync::Arc;

use sales_data_core::{
    Column, ColumnData, DataType, Error, Field, RecordBatch, RecordBatchTransform, Result, Schema,
};

/// Splits a string column on a delimiter into exactly two new columns
///
/// The source column is kept. A non-null value that does not split into
/// exactly two tokens fails the whole batch.
#[derive(Debug, Clone)]
pub struct SplitName {
    column: String,
    first: String,
    last: String,
    delimiter: char,
}

impl SplitName {
    /// Split `column` on `delimiter` into `first` and `last`
    pub fn new(column: &str, first: &str, last: &str, delimiter: char) -> Self {
        Self {
            column: column.to_string(),
            first: first.to_string(),
            last: last.to_string(),
            delimiter,
        }
    }

    fn split<'a>(&self, row: usize, value: &'a str) -> Result<(&'a str, &'a str)> {
        let mut tokens = value.split(self.delimiter);
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(first), Some(last), None) => Ok((first, last)),
            _ => Err(Error::TransformationError(format!(
                "row {row}: '{value}' in column '{}' does not split into exactly two names",
                self.column
            ))),
        }
    }
}

impl Default for SplitName {
    fn default() -> Self {
        Self::new("sales_person", "first_name", "last_name", ' ')
    }
}

impl RecordBatchTransform for SplitName {
    fn name(&self) -> &str {
        "split_name"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let values = batch
            .column_by_name(&self.column)?
            .as_strings()
            .ok_or_else(|| {
                Error::TypeMismatch(format!("column '{}' must be String", self.column))
            })?;

        let mut first = Vec::with_capacity(values.len());
        let mut last = Vec::with_capacity(values.len());
        for (row, value) in values.iter().enumerate() {
            match value {
                Some(value) => {
                    let (f, l) = self.split(row, value)?;
                    first.push(Some(f.to_string()));
                    last.push(Some(l.to_string()));
                }
                None => {
                    first.push(None);
                    last.push(None);
                }
            }
        }

        batch
            .with_column(Column::new(&self.first, ColumnData::String(first)))?
            .with_column(Column::new(&self.last, ColumnData::String(last)))
    }

    fn output_schema(&self, input_schema: &Schema) -> Result<Arc<Schema>> {
        input_schema.index_of(&self.column)?;

        let mut fields: Vec<Field> = input_schema
            .fields()
            .iter()
            .filter(|f| f.name() != self.first && f.name() != self.last)
            .cloned()
            .collect();
        fields.push(Field::new(&self.first, DataType::String, false));
        fields.push(Field::new(&self.last, DataType::String, false));
        Ok(Arc::new(Schema::new(fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_data_core::Value;
    use test_case::test_case;

    fn people(names: &[&str]) -> RecordBatch {
        RecordBatch::from_columns(vec![Column::new(
            "sales_person",
            ColumnData::String(names.iter().map(|n| Some((*n).to_string())).collect()),
        )])
        .unwrap()
    }

    #[test]
    fn test_split_keeps_source_and_appends_names() {
        let output = SplitName::default().transform(people(&["John Smith", "Ann Lee"])).unwrap();

        assert_eq!(output.schema().names(), vec!["sales_person", "first_name", "last_name"]);
        assert_eq!(
            output.column_by_name("first_name").unwrap().value(1).unwrap(),
            Value::String("Ann".into())
        );
        assert_eq!(
            output.column_by_name("last_name").unwrap().value(0).unwrap(),
            Value::String("Smith".into())
        );
    }

    #[test_case("Madonna"; "one token")]
    #[test_case("Mary Ann Lee"; "three tokens")]
    #[test_case("John  Smith"; "double space")]
    fn test_split_rejects_other_token_counts(name: &str) {
        let result = SplitName::default().transform(people(&["Ok Name", name]));
        match result {
            Err(Error::TransformationError(message)) => assert!(message.starts_with("row 1")),
            other => panic!("expected transformation error, got {other:?}"),
        }
    }

    #[test]
    fn test_output_schema_appends_non_nullable_names() {
        let schema = SplitName::default().output_schema(people(&[]).schema()).unwrap();
        assert_eq!(schema.names(), vec!["sales_person", "first_name", "last_name"]);
        assert!(!schema.field_by_name("last_name").unwrap().is_nullable());
    }
}
