//! CSV reader producing typed record batches
//!
//! The whole input is read before any column is typed, so inference sees
//! every value of a column rather than a prefix sample.

mod reader;

pub use reader::{CsvReader, CsvReaderOptions};
