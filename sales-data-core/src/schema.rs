//! Schema definition for tabular sales data
//!
//! A [`Schema`] is an immutable, ordered set of [`Field`]s. Each field carries a
//! data type, a nullability flag and a list of value [`Check`]s, which together
//! form the structural contract that [`crate::validation::validate`] enforces.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::column::Value;
use crate::error::{Error, Result};

/// Data type for column values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type
    Boolean,

    /// 64-bit signed integer
    Int64,

    /// 64-bit floating point
    Float64,

    /// UTF-8 encoded string
    String,

    /// Calendar date without time zone
    Date,
}

impl DataType {
    /// Check if this type is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "Boolean"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::Float64 => write!(f, "Float64"),
            DataType::String => write!(f, "String"),
            DataType::Date => write!(f, "Date"),
        }
    }
}

/// A value-level check attached to a field
#[derive(Debug, Clone)]
pub enum Check {
    /// Value must be one of the listed strings
    IsIn(Vec<String>),

    /// Value must be less than or equal to the bound
    LessOrEqual(Value),

    /// Value must be greater than or equal to the bound
    GreaterOrEqual(Value),

    /// String value must match the pattern at its start
    StrMatches(Regex),
}

impl Check {
    /// Build a string-match check, anchoring the pattern at the start of the value
    pub fn str_matches(pattern: &str) -> Result<Self> {
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^(?:{pattern})")
        };

        Regex::new(&anchored)
            .map(Check::StrMatches)
            .map_err(|e| Error::InvalidArgument(format!("invalid pattern '{pattern}': {e}")))
    }

    /// Name under which failures of this check are reported
    pub fn name(&self) -> String {
        match self {
            Check::IsIn(allowed) => format!("isin({allowed:?})"),
            Check::LessOrEqual(bound) => format!("less_than_or_equal_to({bound})"),
            Check::GreaterOrEqual(bound) => format!("greater_than_or_equal_to({bound})"),
            Check::StrMatches(regex) => format!("str_matches('{}')", regex.as_str()),
        }
    }

    /// Evaluate this check against a non-null value
    pub fn passes(&self, value: &Value) -> bool {
        match self {
            Check::IsIn(allowed) => match value {
                Value::String(s) => allowed.iter().any(|a| a == s),
                _ => false,
            },
            Check::LessOrEqual(bound) => value
                .partial_cmp_value(bound)
                .is_some_and(|ord| ord.is_le()),
            Check::GreaterOrEqual(bound) => value
                .partial_cmp_value(bound)
                .is_some_and(|ord| ord.is_ge()),
            Check::StrMatches(regex) => match value {
                Value::String(s) => regex.is_match(s),
                _ => false,
            },
        }
    }
}

impl PartialEq for Check {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Check::IsIn(a), Check::IsIn(b)) => a == b,
            (Check::LessOrEqual(a), Check::LessOrEqual(b))
            | (Check::GreaterOrEqual(a), Check::GreaterOrEqual(b)) => a == b,
            (Check::StrMatches(a), Check::StrMatches(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// A field in a schema, with a name, data type, nullability and value checks
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Name of the field
    pub name: String,

    /// Data type of the field
    pub data_type: DataType,

    /// Whether the field can be null
    pub nullable: bool,

    /// Checks every non-null value must pass
    pub checks: Vec<Check>,
}

impl Field {
    /// Create a new field without checks
    pub fn new(name: &str, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            nullable,
            checks: Vec::new(),
        }
    }

    /// Attach a check to this field
    #[must_use]
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Get the name of this field
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the data type of this field
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Check if this field is nullable
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Get the checks of this field
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Copy of this field under a different name
    #[must_use]
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}: {} (nullable)", self.name, self.data_type)
        } else {
            write!(f, "{}: {} (non-nullable)", self.name, self.data_type)
        }
    }
}

/// A schema describing a dataset's structure
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Optional schema name, used in validation reports
    name: Option<String>,

    /// Fields in this schema
    fields: Vec<Field>,

    /// Field indices by name for faster lookup
    field_indices: HashMap<String, usize>,
}

impl Schema {
    /// Create a new anonymous schema with the given fields
    pub fn new(fields: Vec<Field>) -> Self {
        let field_indices = Self::index_fields(&fields);

        Self {
            name: None,
            fields,
            field_indices,
        }
    }

    /// Create a new named schema with the given fields
    pub fn named(name: &str, fields: Vec<Field>) -> Self {
        let mut schema = Self::new(fields);
        schema.name = Some(name.to_string());
        schema
    }

    fn index_fields(fields: &[Field]) -> HashMap<String, usize> {
        let mut field_indices = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            field_indices.insert(field.name.clone(), i);
        }
        field_indices
    }

    /// Name of this schema, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get all fields in this schema
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get a field by name
    pub fn field_by_name(&self, name: &str) -> Result<&Field> {
        let index = self.index_of(name)?;
        Ok(&self.fields[index])
    }

    /// Get the index of a field by name
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.field_indices
            .get(name)
            .copied()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Whether a field with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.field_indices.contains_key(name)
    }

    /// Names of all fields, in order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Get the number of fields in this schema
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if this schema is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether two schemas describe the same column names and types, in order
    pub fn same_shape(&self, other: &Schema) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.name == b.name && a.data_type == b.data_type)
    }

    /// Shared handle to this schema
    pub fn into_ref(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => writeln!(f, "Schema '{}': {} fields", name, self.fields.len())?,
            None => writeln!(f, "Schema: {} fields", self.fields.len())?,
        }
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::named("people", vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::String, true),
        ]);

        assert_eq!(schema.name(), Some("people"));
        assert_eq!(schema.index_of("name").unwrap(), 1);
        assert!(schema.contains("id"));
        assert!(matches!(schema.index_of("age"), Err(Error::ColumnNotFound(_))));
        assert_eq!(schema.names(), vec!["id", "name"]);
    }

    #[test]
    fn test_str_matches_is_anchored_at_start() {
        let check = Check::str_matches(r"\d{2}-[A-Z][a-z]{2}-\d{2}").unwrap();

        assert!(check.passes(&Value::String("04-Jan-22".into())));
        assert!(check.passes(&Value::String("04-Jan-22 trailing".into())));
        assert!(!check.passes(&Value::String("x04-Jan-22".into())));
        assert!(!check.passes(&Value::String("2022-01-04".into())));
    }

    #[test]
    fn test_range_checks_compare_across_numeric_types() {
        let le = Check::LessOrEqual(Value::Int64(1000));
        assert!(le.passes(&Value::Int64(1000)));
        assert!(le.passes(&Value::Float64(999.5)));
        assert!(!le.passes(&Value::Int64(1500)));

        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let ge = Check::GreaterOrEqual(Value::Date(start));
        assert!(ge.passes(&Value::Date(start)));
        assert!(!ge.passes(&Value::Date(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap())));
        assert!(!ge.passes(&Value::String("2023-01-01".into())));
    }

    #[test]
    fn test_check_names() {
        let isin = Check::IsIn(vec!["UK".into()]);
        assert_eq!(isin.name(), "isin([\"UK\"])");
        assert_eq!(Check::LessOrEqual(Value::Int64(1000)).name(), "less_than_or_equal_to(1000)");
    }
}
