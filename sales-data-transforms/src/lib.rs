//! Column transformations for the sales data pipeline
//!
//! Each transform is a [`sales_data_core::RecordBatchTransform`] and can be recorded as a stage
//! of a [`sales_data_core::LazyDataset`]. [`sales_transforms`] builds the fixed
//! sequence that turns an input-shaped batch into an output-shaped one.

#![warn(missing_docs)]

pub mod amount;
pub mod date;
pub mod name;

pub use amount::{digits_to_f64, CoerceAmount};
pub use date::{ParseDate, SALE_DATE_FORMAT};
pub use name::SplitName;

use sales_data_core::TransformChain;

/// Name splitting, then date parsing, then amount coercion
pub fn sales_transforms() -> TransformChain {
    TransformChain::default()
        .then(SplitName::default())
        .then(ParseDate::default())
        .then(CoerceAmount::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_data_core::{Column, ColumnData, RecordBatch, RecordBatchTransform, Value};

    fn raw_row() -> RecordBatch {
        let text = |name: &str, v: &str| Column::constant(name, &Value::String(v.into()), 1);
        RecordBatch::from_columns(vec![
            text("sales_person", "John Smith"),
            text("country", "India"),
            text("product", "Mint"),
            text("date", "05-Sep-23"),
            text("amount", "$1,234.00"),
            Column::new("boxes_shipped", ColumnData::Int64(vec![Some(42)])),
        ])
        .unwrap()
    }

    #[test]
    fn test_sales_transforms_end_to_end() {
        let chain = sales_transforms();
        let output = chain.transform(raw_row()).unwrap();

        assert_eq!(
            output.schema().names(),
            vec![
                "sales_person",
                "country",
                "product",
                "amount",
                "boxes_shipped",
                "first_name",
                "last_name",
                "sale_date"
            ]
        );
        let value = |name: &str| output.column_by_name(name).unwrap().value(0).unwrap();
        assert_eq!(value("first_name"), Value::String("John".into()));
        assert_eq!(value("last_name"), Value::String("Smith".into()));
        assert_eq!(value("sale_date"), Value::Date(NaiveDate::from_ymd_opt(2023, 9, 5).unwrap()));
        assert_eq!(value("amount"), Value::Float64(123_400.0));
        assert_eq!(value("boxes_shipped"), Value::Int64(42));
        assert!(output.column_by_name("date").is_err());
    }

    #[test]
    fn test_declared_schema_matches_result() {
        let chain = sales_transforms();
        let input = raw_row();
        let declared = chain.output_schema(input.schema()).unwrap();
        let actual = chain.transform(input).unwrap();
        assert!(declared.same_shape(actual.schema()));
    }
}
