//! Locators, format detection, type inference and column-name normalization

use std::fmt;
use std::sync::Arc;

use sales_data_core::{DataType, RecordBatch, RecordBatchTransform, Schema};

use crate::error::{Error, Result};

/// Supported tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Comma separated values with a header row
    Csv,

    /// JSON records or column-oriented object
    Json,
}

impl FileFormat {
    /// Format for a file extension, matched case-sensitively
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(FileFormat::Csv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    /// Tag recorded in run metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote URL or local filesystem path naming a source dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
}

impl Locator {
    /// Wrap a locator string
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The locator exactly as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this locator is fetched over HTTP(S)
    pub fn is_remote(&self) -> bool {
        self.raw.starts_with("http://") || self.raw.starts_with("https://")
    }

    /// The locator with its query string removed
    pub fn without_query(&self) -> &str {
        self.raw.split_once('?').map_or(self.raw.as_str(), |(path, _)| path)
    }

    /// Extension used for format detection
    ///
    /// A `?...` suffix is stripped only when the locator carries a `token=`
    /// parameter; any other query stays part of the extension.
    pub fn extension(&self) -> &str {
        let path = if self.raw.contains("token=") {
            self.without_query()
        } else {
            self.raw.as_str()
        };
        let name = last_segment(path);
        name.rsplit_once('.').map_or("", |(_, ext)| ext)
    }

    /// Detected format, failing for anything outside the supported set
    pub fn format(&self) -> Result<FileFormat> {
        let extension = self.extension();
        FileFormat::from_extension(extension).ok_or_else(|| Error::UnsupportedFormat {
            locator: self.raw.clone(),
            extension: extension.to_string(),
        })
    }

    /// Base name without extension or query string
    pub fn file_stem(&self) -> &str {
        let name = last_segment(self.without_query());
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Schema inference utilities
pub struct SchemaInference;

impl SchemaInference {
    /// Infer data type for a column of string values
    ///
    /// Empty strings count as nulls and do not influence the result.
    pub fn infer_data_type(values: &[&str]) -> DataType {
        let non_empty_values: Vec<&str> =
            values.iter().filter(|s| !s.is_empty()).copied().collect();

        if non_empty_values.is_empty() {
            return DataType::String;
        }

        // Try to parse as integer
        if non_empty_values.iter().all(|s| s.parse::<i64>().is_ok()) {
            return DataType::Int64;
        }

        // Try to parse as float
        if non_empty_values.iter().all(|s| s.parse::<f64>().is_ok()) {
            return DataType::Float64;
        }

        DataType::String
    }
}

/// Normalize a column name: whitespace runs become `_`, then lowercase, then trim
pub fn normalize_column_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                normalized.push('_');
            }
            in_whitespace = true;
        } else {
            normalized.push(c);
            in_whitespace = false;
        }
    }
    normalized.to_lowercase().trim().to_string()
}

/// Dataset stage renaming every column with [`normalize_column_name`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeColumnNames;

impl RecordBatchTransform for NormalizeColumnNames {
    fn name(&self) -> &str {
        "normalize_column_names"
    }

    fn transform(&self, batch: RecordBatch) -> sales_data_core::Result<RecordBatch> {
        batch.rename_columns(normalize_column_name)
    }

    fn output_schema(&self, input_schema: &Schema) -> sales_data_core::Result<Arc<Schema>> {
        let fields = input_schema
            .fields()
            .iter()
            .map(|f| f.renamed(&normalize_column_name(f.name())))
            .collect();
        Ok(Arc::new(Schema::new(fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sales_data_core::{Column, ColumnData, LazyDataset};
    use test_case::test_case;

    #[test_case("https://host/data/sales.csv", Some(FileFormat::Csv); "remote csv")]
    #[test_case("data/sales.json", Some(FileFormat::Json); "local json")]
    #[test_case("https://host/sales.csv?token=abc", Some(FileFormat::Csv); "token query stripped")]
    #[test_case("https://host/sales.csv?page=2", None; "other query kept")]
    #[test_case("data/sales.parquet", None; "unsupported extension")]
    #[test_case("data/sales.CSV", None; "extension is case sensitive")]
    #[test_case("data/sales", None; "no extension")]
    fn test_format_detection(locator: &str, expected: Option<FileFormat>) {
        assert_eq!(Locator::new(locator).format().ok(), expected);
    }

    #[test]
    fn test_unsupported_format_reports_extension() {
        match Locator::new("s3/sales.txt").format() {
            Err(Error::UnsupportedFormat { extension, .. }) => assert_eq!(extension, "txt"),
            other => panic!("expected unsupported format, got {other:?}"),
        }
    }

    #[test_case("https://host/a/b/sales_2023.csv?token=x", "sales_2023")]
    #[test_case("data/sales.json", "sales")]
    #[test_case("sales", "sales")]
    fn test_file_stem(locator: &str, stem: &str) {
        assert_eq!(Locator::new(locator).file_stem(), stem);
    }

    #[test]
    fn test_is_remote() {
        assert!(Locator::new("https://host/x.csv").is_remote());
        assert!(!Locator::new("/tmp/x.csv").is_remote());
    }

    #[test_case("Sales Person", "sales_person")]
    #[test_case("Boxes  Shipped", "boxes_shipped")]
    #[test_case("Amount", "amount")]
    #[test_case("already_done", "already_done")]
    fn test_normalize_column_name(raw: &str, expected: &str) {
        assert_eq!(normalize_column_name(raw), expected);
    }

    #[test]
    fn test_infer_data_type() {
        assert_eq!(SchemaInference::infer_data_type(&["1", "", "3"]), DataType::Int64);
        assert_eq!(SchemaInference::infer_data_type(&["1", "2.5"]), DataType::Float64);
        assert_eq!(SchemaInference::infer_data_type(&["$1", "2"]), DataType::String);
        assert_eq!(SchemaInference::infer_data_type(&["", ""]), DataType::String);
    }

    #[test]
    fn test_normalize_stage_renames_columns() {
        let batch = RecordBatch::from_columns(vec![Column::new(
            "Sales Person",
            ColumnData::String(vec![Some("A B".into())]),
        )])
        .unwrap();
        let dataset = LazyDataset::from_batch(batch).then(NormalizeColumnNames);

        assert_eq!(dataset.schema().unwrap().names(), vec!["sales_person"]);
        assert_eq!(dataset.collect().unwrap().schema().names(), vec!["sales_person"]);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(name in "[ A-Za-z0-9_\t]{0,24}") {
            let once = normalize_column_name(&name);
            prop_assert_eq!(normalize_column_name(&once), once);
        }
    }
}
