//! CSV reader implementation

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use sales_data_core::{Column, ColumnData, DataType, RecordBatch};

use crate::common::SchemaInference;
use crate::error::{Error, Result};

/// Options for CSV reader
#[derive(Debug, Clone)]
pub struct CsvReaderOptions {
    /// Delimiter character
    pub delimiter: u8,

    /// Quote character
    pub quote: u8,

    /// Whether to trim whitespace around fields
    pub trim: bool,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: false,
        }
    }
}

/// CSV reader turning a headed CSV document into a single record batch
pub struct CsvReader<R: Read> {
    /// Inner CSV reader
    reader: csv::Reader<R>,
}

impl<R: Read> CsvReader<R> {
    /// Create a new CSV reader; the first row is the header
    pub fn new(reader: R, options: &CsvReaderOptions) -> Self {
        let trim = if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        };

        let reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .trim(trim)
            .from_reader(reader);

        Self { reader }
    }

    /// Read every record and build typed columns
    pub fn read_all(mut self) -> Result<RecordBatch> {
        let header: StringRecord = self.reader.headers()?.clone();
        if header.is_empty() {
            return Err(Error::Format("CSV input has no header row".into()));
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); header.len()];
        for record in self.reader.records() {
            let record = record?;
            for (column, cell) in cells.iter_mut().zip(record.iter()) {
                column.push(cell.to_string());
            }
        }

        let columns = header
            .iter()
            .zip(cells)
            .map(|(name, values)| build_column(name, &values))
            .collect::<Result<Vec<_>>>()?;

        let batch = RecordBatch::from_columns(columns)?;
        tracing::debug!(rows = batch.num_rows(), columns = batch.num_columns(), "read csv");
        Ok(batch)
    }
}

fn build_column(name: &str, values: &[String]) -> Result<Column> {
    let refs: Vec<&str> = values.iter().map(String::as_str).collect();

    let data = match SchemaInference::infer_data_type(&refs) {
        DataType::Int64 => ColumnData::Int64(
            refs.iter()
                .map(|s| parse_cell::<i64>(name, s))
                .collect::<Result<_>>()?,
        ),
        DataType::Float64 => ColumnData::Float64(
            refs.iter()
                .map(|s| parse_cell::<f64>(name, s))
                .collect::<Result<_>>()?,
        ),
        _ => ColumnData::String(
            values
                .iter()
                .map(|s| (!s.is_empty()).then(|| s.clone()))
                .collect(),
        ),
    };

    Ok(Column::new(name, data))
}

fn parse_cell<T: std::str::FromStr>(column: &str, cell: &str) -> Result<Option<T>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse()
        .map(Some)
        .map_err(|_| Error::Format(format!("invalid value '{cell}' in column '{column}'")))
}
