//! File-backed SQLite store for the sales data pipeline
//!
//! Tables are append-only. Each append assigns row ids continuing from the
//! table's current row count, and each page read is cursor based on those ids.

#![warn(missing_docs)]

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{validate_identifier, AppendSummary, PageQuery, Store, ID_COLUMN};
