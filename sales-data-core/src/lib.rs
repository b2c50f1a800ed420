//! Core traits, data structures, and schema validation for the sales data pipeline
//!
//! This crate provides the foundational components the other crates build upon:
//! typed columns and record batches, declarative schemas with per-field checks,
//! source and transform traits, the staged [`LazyDataset`], and the
//! collect-all-errors [`validate`] routine.

#![warn(missing_docs)]

pub mod column;
pub mod dataset;
pub mod error;
pub mod record_batch;
pub mod schema;
pub mod source;
pub mod transform;
pub mod validation;

// Re-export key types for convenience
pub use column::{Column, ColumnData, Value};
pub use dataset::LazyDataset;
pub use error::{Error, Result};
pub use record_batch::RecordBatch;
pub use schema::{Check, DataType, Field, Schema};
pub use source::{InMemorySource, InMemorySourceFactory, RecordBatchSource, SourceFactory};
pub use transform::{RecordBatchTransform, TransformChain};
pub use validation::{validate, FailureCase, SchemaErrors, ValidateStage};
