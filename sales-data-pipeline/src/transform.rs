//! The cleaning stages of a run

use sales_data_core::LazyDataset;
use sales_data_transforms::sales_transforms;

/// Record the cleaning stages on `dataset`: name split, date parse, amount coercion
///
/// Nothing runs until the returned dataset is collected.
pub fn transform(dataset: LazyDataset) -> LazyDataset {
    dataset.then_all(&sales_transforms())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_data_core::{Column, ColumnData, RecordBatch};

    #[test]
    fn test_stages_are_recorded_in_order() {
        let batch = RecordBatch::from_columns(vec![Column::new(
            "sales_person",
            ColumnData::String(vec![Some("John Smith".into())]),
        )])
        .unwrap();

        let dataset = transform(LazyDataset::from_batch(batch));
        assert_eq!(dataset.stage_names(), vec!["split_name", "parse_date", "coerce_amount"]);
        // the date stage would fail on this batch, so nothing has run yet
        assert!(dataset.collect().is_err());
    }
}
