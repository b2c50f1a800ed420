//! Record batch implementation for columnar data processing

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::column::{Column, ColumnData, Value};
use crate::error::{Error, Result};
use crate::schema::{Field, Schema};

/// A collection of equally long columns representing a batch of records
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    /// Schema describing the data
    schema: Arc<Schema>,

    /// Columns in this batch, in schema order
    columns: Vec<Column>,

    /// Number of rows in this batch
    row_count: usize,
}

impl RecordBatch {
    /// Create a new record batch with the given schema and columns
    pub fn new(schema: Arc<Schema>, columns: Vec<Column>) -> Result<Self> {
        if columns.len() != schema.fields().len() {
            return Err(Error::InvalidArgument(format!(
                "Number of columns ({}) does not match schema ({})",
                columns.len(),
                schema.fields().len()
            )));
        }

        // Verify columns match schema
        for (field, column) in schema.fields().iter().zip(columns.iter()) {
            if column.name() != field.name() {
                return Err(Error::InvalidArgument(format!(
                    "Column name mismatch: expected '{}', got '{}'",
                    field.name(),
                    column.name()
                )));
            }

            if column.data_type() != *field.data_type() {
                return Err(Error::TypeMismatch(format!(
                    "Column type mismatch for '{}': expected {}, got {}",
                    field.name(),
                    field.data_type(),
                    column.data_type()
                )));
            }
        }

        let row_count = columns.first().map_or(0, Column::len);
        if let Some(column) = columns.iter().find(|c| c.len() != row_count) {
            return Err(Error::InvalidArgument(format!(
                "Column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                row_count
            )));
        }

        Ok(Self {
            schema,
            columns,
            row_count,
        })
    }

    /// Create a batch whose schema is derived from the columns themselves
    ///
    /// Every derived field is nullable and carries no checks.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name().to_string()) {
                return Err(Error::InvalidArgument(format!(
                    "Duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        let fields = columns
            .iter()
            .map(|c| Field::new(c.name(), c.data_type(), true))
            .collect();

        Self::new(Arc::new(Schema::new(fields)), columns)
    }

    /// Create a new empty record batch with the given schema
    pub fn empty(schema: Arc<Schema>) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| Column::new(f.name(), ColumnData::empty(*f.data_type())))
            .collect();

        Self {
            schema,
            columns,
            row_count: 0,
        }
    }

    /// Concatenate batches sharing the same column names and types
    pub fn concat(schema: Arc<Schema>, batches: &[RecordBatch]) -> Result<Self> {
        let mut result = Self::empty(schema);

        for batch in batches {
            if !batch.schema.same_shape(&result.schema) {
                return Err(Error::SchemaMismatch(
                    "cannot concatenate batches with different schemas".into(),
                ));
            }
            for (target, source) in result.columns.iter_mut().zip(batch.columns.iter()) {
                target.append(source)?;
            }
            result.row_count += batch.row_count;
        }

        Ok(result)
    }

    /// Get the schema of this batch
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get the number of rows in this batch
    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns in this batch
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check if this batch is empty
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Get a reference to a column by index
    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            length: self.columns.len(),
        })
    }

    /// Get a reference to a column by name
    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        let index = self.schema.index_of(name)?;
        self.column(index)
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Values of one row, in column order
    pub fn row(&self, index: usize) -> Result<Vec<Value>> {
        self.columns.iter().map(|c| c.value(index)).collect()
    }

    /// Slice this batch to a range of rows
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        if offset + length > self.row_count {
            return Err(Error::IndexOutOfBounds {
                index: offset + length,
                length: self.row_count,
            });
        }

        let columns = self
            .columns
            .iter()
            .map(|c| c.slice(offset, length))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            schema: self.schema.clone(),
            columns,
            row_count: length,
        })
    }

    /// Replace the column with the same name, or append it as a new column
    pub fn with_column(self, column: Column) -> Result<Self> {
        match self.schema.index_of(column.name()) {
            Ok(index) => {
                let mut columns = self.columns;
                columns[index] = column;
                Self::rebuild(&self.schema, columns)
            }
            Err(_) => {
                let index = self.columns.len();
                self.insert_column(index, column)
            }
        }
    }

    /// Insert a new column at `index`
    pub fn insert_column(self, index: usize, column: Column) -> Result<Self> {
        if self.schema.contains(column.name()) {
            return Err(Error::InvalidArgument(format!(
                "Column '{}' already exists",
                column.name()
            )));
        }
        if index > self.columns.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                length: self.columns.len(),
            });
        }

        let mut columns = self.columns;
        columns.insert(index, column);
        Self::rebuild(&self.schema, columns)
    }

    /// Remove the named columns
    pub fn drop_columns(self, names: &[&str]) -> Result<Self> {
        for name in names {
            self.schema.index_of(name)?;
        }

        let columns = self
            .columns
            .into_iter()
            .filter(|c| !names.contains(&c.name()))
            .collect();
        Self::rebuild(&self.schema, columns)
    }

    /// Rename every column through `rename`
    pub fn rename_columns<F>(self, rename: F) -> Result<Self>
    where
        F: Fn(&str) -> String,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| c.renamed(&rename(c.name())))
            .collect::<Vec<_>>();

        let mut seen = HashSet::with_capacity(columns.len());
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.name().to_string())) {
            return Err(Error::InvalidArgument(format!(
                "Renaming produces duplicate column '{}'",
                dup.name()
            )));
        }

        let fields = columns
            .iter()
            .zip(self.schema.fields())
            .map(|(c, f)| f.renamed(c.name()))
            .collect();
        Self::new(Arc::new(Schema::new(fields)), columns)
    }

    /// Build a batch from `columns`, keeping field definitions from `previous` where names match
    fn rebuild(previous: &Schema, columns: Vec<Column>) -> Result<Self> {
        let fields = columns
            .iter()
            .map(|c| match previous.field_by_name(c.name()) {
                Ok(field) if *field.data_type() == c.data_type() => field.clone(),
                _ => Field::new(c.name(), c.data_type(), true),
            })
            .collect();

        Self::new(Arc::new(Schema::new(fields)), columns)
    }
}

impl fmt::Display for RecordBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_ROWS: usize = 10;

        writeln!(
            f,
            "RecordBatch: {} rows, {} columns",
            self.row_count,
            self.columns.len()
        )?;
        writeln!(f, "{}", self.schema.names().join(" | "))?;

        for row in 0..self.row_count.min(MAX_ROWS) {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.value(row).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }

        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }

        Ok(())
    }
}
