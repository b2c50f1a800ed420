//! Sales data pipeline
//!
//! One run takes a single source through
//! fetch, transform, output validation with data-quality profiling, and
//! persistence. The [`driver`] runs every configured source in turn and then
//! serves the read API from [`sales_data_api`].

#![warn(missing_docs)]

pub mod config;
pub mod driver;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod metadata;
pub mod orchestrator;
pub mod persist;
pub mod quality;
pub mod registry;
pub mod transform;

pub use config::AppConfig;
pub use driver::Mode;
pub use error::{PipelineError, Result};
pub use fetch::Fetcher;
pub use metadata::RunMetadata;
pub use orchestrator::{Destinations, Orchestrator, RunState, RunSummary};
pub use persist::Persister;
pub use quality::{validate_dataset, DqMetrics, ValidationReport};
pub use registry::SchemaRegistry;
