//! Column implementation for storing typed vectors of data

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::schema::DataType;

/// A single dynamically typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit floating point
    Float64(f64),

    /// UTF-8 string
    String(String),

    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Data type of this value, `None` for null
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::Date(_) => Some(DataType::Date),
        }
    }

    /// Numeric view of this value
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Compare two values of compatible types
    ///
    /// Integers and floats compare numerically with each other; every other
    /// pairing of distinct types is incomparable.
    pub fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Convert this value into JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(v) => serde_json::Value::Bool(*v),
            Value::Int64(v) => serde_json::Value::from(*v),
            Value::Float64(v) => serde_json::Number::from_f64(*v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Date(v) => serde_json::Value::String(v.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

/// Typed storage behind a [`Column`]
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Boolean values
    Boolean(Vec<Option<bool>>),

    /// 64-bit integer values
    Int64(Vec<Option<i64>>),

    /// 64-bit float values
    Float64(Vec<Option<f64>>),

    /// String values
    String(Vec<Option<String>>),

    /// Date values
    Date(Vec<Option<NaiveDate>>),
}

macro_rules! map_column_data {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            ColumnData::Boolean($values) => ColumnData::Boolean($body),
            ColumnData::Int64($values) => ColumnData::Int64($body),
            ColumnData::Float64($values) => ColumnData::Float64($body),
            ColumnData::String($values) => ColumnData::String($body),
            ColumnData::Date($values) => ColumnData::Date($body),
        }
    };
}

impl ColumnData {
    /// Create empty storage of the given type
    pub fn empty(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => ColumnData::Boolean(Vec::new()),
            DataType::Int64 => ColumnData::Int64(Vec::new()),
            DataType::Float64 => ColumnData::Float64(Vec::new()),
            DataType::String => ColumnData::String(Vec::new()),
            DataType::Date => ColumnData::Date(Vec::new()),
        }
    }

    /// Data type of the stored values
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Boolean(_) => DataType::Boolean,
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::String(_) => DataType::String,
            ColumnData::Date(_) => DataType::Date,
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::String(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    /// Check if there are no stored values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_null(&self, index: usize) -> bool {
        match self {
            ColumnData::Boolean(v) => v[index].is_none(),
            ColumnData::Int64(v) => v[index].is_none(),
            ColumnData::Float64(v) => v[index].is_none(),
            ColumnData::String(v) => v[index].is_none(),
            ColumnData::Date(v) => v[index].is_none(),
        }
    }

    fn value(&self, index: usize) -> Value {
        match self {
            ColumnData::Boolean(v) => v[index].map_or(Value::Null, Value::Boolean),
            ColumnData::Int64(v) => v[index].map_or(Value::Null, Value::Int64),
            ColumnData::Float64(v) => v[index].map_or(Value::Null, Value::Float64),
            ColumnData::String(v) => v[index].clone().map_or(Value::Null, Value::String),
            ColumnData::Date(v) => v[index].map_or(Value::Null, Value::Date),
        }
    }

    fn take(&self, indices: &[usize]) -> Self {
        map_column_data!(self, values => indices.iter().map(|&i| values[i].clone()).collect())
    }

    fn extend(&mut self, other: &ColumnData) -> Result<()> {
        match (self, other) {
            (ColumnData::Boolean(a), ColumnData::Boolean(b)) => a.extend_from_slice(b),
            (ColumnData::Int64(a), ColumnData::Int64(b)) => a.extend_from_slice(b),
            (ColumnData::Float64(a), ColumnData::Float64(b)) => a.extend_from_slice(b),
            (ColumnData::String(a), ColumnData::String(b)) => a.extend_from_slice(b),
            (ColumnData::Date(a), ColumnData::Date(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(Error::TypeMismatch(format!(
                    "cannot append {} values to a {} column",
                    b.data_type(),
                    a.data_type()
                )))
            }
        }
        Ok(())
    }
}

/// A named column of data with a specific type
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Name of the column
    name: String,

    /// Typed values, `None` marks a null entry
    data: ColumnData,
}

impl Column {
    /// Create a new column with the given name and data
    pub fn new(name: &str, data: ColumnData) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }

    /// Create a column repeating one value `length` times
    ///
    /// The column type is taken from the value; a null value yields a string column.
    pub fn constant(name: &str, value: &Value, length: usize) -> Self {
        let data = match value {
            Value::Null => ColumnData::String(vec![None; length]),
            Value::Boolean(v) => ColumnData::Boolean(vec![Some(*v); length]),
            Value::Int64(v) => ColumnData::Int64(vec![Some(*v); length]),
            Value::Float64(v) => ColumnData::Float64(vec![Some(*v); length]),
            Value::String(v) => ColumnData::String(vec![Some(v.clone()); length]),
            Value::Date(v) => ColumnData::Date(vec![Some(*v); length]),
        };
        Self::new(name, data)
    }

    /// Get the name of this column
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of this column under a different name
    #[must_use]
    pub fn renamed(&self, name: &str) -> Self {
        Self::new(name, self.data.clone())
    }

    /// Get the data type of this column
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Get the typed storage of this column
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Get the length of this column (number of values)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if this column is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of null values in this column
    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.data.is_null(i)).count()
    }

    /// Check if a specific value is null
    pub fn is_null(&self, index: usize) -> bool {
        index < self.len() && self.data.is_null(index)
    }

    /// Get the value at `index`
    pub fn value(&self, index: usize) -> Result<Value> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                length: self.len(),
            });
        }
        Ok(self.data.value(index))
    }

    /// Iterate over all values
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |i| self.data.value(i))
    }

    /// String values, if this is a string column
    pub fn as_strings(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::String(v) => Some(v),
            _ => None,
        }
    }

    /// Copy a contiguous range of rows into a new column
    pub fn slice(&self, offset: usize, length: usize) -> Result<Self> {
        if offset + length > self.len() {
            return Err(Error::IndexOutOfBounds {
                index: offset + length,
                length: self.len(),
            });
        }
        let indices: Vec<usize> = (offset..offset + length).collect();
        Ok(self.take(&indices))
    }

    /// Gather the rows at `indices`, in that order
    pub fn take(&self, indices: &[usize]) -> Self {
        Self::new(&self.name, self.data.take(indices))
    }

    /// Append the values of another column of the same type
    pub fn append(&mut self, other: &Column) -> Result<()> {
        self.data.extend(&other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_and_nulls() {
        let column = Column::new("boxes", ColumnData::Int64(vec![Some(1), None, Some(3)]));

        assert_eq!(column.len(), 3);
        assert_eq!(column.data_type(), DataType::Int64);
        assert_eq!(column.null_count(), 1);
        assert!(column.is_null(1));
        assert_eq!(column.value(2).unwrap(), Value::Int64(3));
        assert!(column.value(3).is_err());
    }

    #[test]
    fn test_slice_take_and_append() {
        let mut column = Column::new(
            "name",
            ColumnData::String(vec![Some("a".into()), Some("b".into()), None]),
        );

        let sliced = column.slice(1, 2).unwrap();
        assert_eq!(
            sliced.values().collect::<Vec<_>>(),
            vec![Value::String("b".into()), Value::Null]
        );

        let taken = column.take(&[2, 0]);
        assert_eq!(taken.value(1).unwrap(), Value::String("a".into()));

        column.append(&sliced).unwrap();
        assert_eq!(column.len(), 5);

        let ints = Column::constant("n", &Value::Int64(1), 2);
        assert!(column.append(&ints).is_err());
    }

    #[test]
    fn test_value_to_json() {
        let date = NaiveDate::from_ymd_opt(2023, 9, 5).unwrap();
        assert_eq!(Value::Date(date).to_json(), serde_json::json!("2023-09-05"));
        assert_eq!(Value::Float64(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(Value::Int64(7).to_json(), serde_json::json!(7));
    }
}
