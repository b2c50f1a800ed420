//! Lifecycle of a single pipeline run
//!
//! A run moves strictly forward through
//! `Start -> Fetched -> Transformed -> Validated -> (Persisted | Skipped) -> Done`.
//! Records and metrics are written only when the transformed batch passes the
//! output schema.

use std::fmt;
use std::sync::Arc;

use sales_data_core::Schema;
use sales_data_readers::Locator;

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::persist::Persister;
use crate::quality::validate_dataset;
use crate::transform::transform;

/// Stage reached by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing done yet
    Start,
    /// Source loaded and input-validated
    Fetched,
    /// Cleaning stages recorded
    Transformed,
    /// Output schema checked and metrics computed
    Validated,
    /// Records and metrics appended
    Persisted,
    /// Output validation failed, nothing written
    Skipped,
    /// Run finished
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "start",
            RunState::Fetched => "fetched",
            RunState::Transformed => "transformed",
            RunState::Validated => "validated",
            RunState::Persisted => "persisted",
            RunState::Skipped => "skipped",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal observation of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Identifier of the run
    pub run_id: String,

    /// Rows in the transformed batch
    pub rows: usize,

    /// Whether the output schema accepted the batch
    pub passed: bool,

    /// Whether records and metrics were written
    pub persisted: bool,
}

/// Table names a run writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    /// Table of cleaned records
    pub records: String,

    /// Table of data-quality metrics
    pub metrics: String,
}

/// Sequences fetch, transform, validate and persist for one source at a time
#[derive(Debug, Clone)]
pub struct Orchestrator {
    fetcher: Fetcher,
    output_schema: Arc<Schema>,
    persister: Persister,
    destinations: Destinations,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        fetcher: Fetcher,
        output_schema: Arc<Schema>,
        persister: Persister,
        destinations: Destinations,
    ) -> Self {
        Self {
            fetcher,
            output_schema,
            persister,
            destinations,
        }
    }

    /// Run the pipeline once against `locator`
    ///
    /// Failures up to and including fetching, a failing transform and a
    /// failing store write end the run with an error. A batch rejected by the
    /// output schema ends the run normally with `persisted = false`.
    pub async fn run(&self, locator: &Locator) -> Result<RunSummary> {
        let mut state = RunState::Start;

        let (dataset, run) = self.fetcher.fetch(locator).await?;
        advance(&mut state, RunState::Fetched, &run.run_id);

        let dataset = transform(dataset);
        advance(&mut state, RunState::Transformed, &run.run_id);

        let report = validate_dataset(&dataset, &self.output_schema)?;
        advance(&mut state, RunState::Validated, &run.run_id);
        tracing::info!(run_id = %run.run_id, passed = report.passed, "output validation finished");

        let rows = report.batch.num_rows();
        let persisted = if report.passed {
            let metrics = report.metrics.to_batch()?;
            self.persister.save(report.batch, &run, &self.destinations.records).await?;
            self.persister.save(metrics, &run, &self.destinations.metrics).await?;
            advance(&mut state, RunState::Persisted, &run.run_id);
            true
        } else {
            tracing::info!(
                run_id = %run.run_id,
                categorical_stats = %report.metrics.categorical_stats,
                numeric_stats = %report.metrics.numeric_stats,
                null_count = %report.metrics.null_count,
                "skipping persistence of records and metrics"
            );
            advance(&mut state, RunState::Skipped, &run.run_id);
            false
        };

        advance(&mut state, RunState::Done, &run.run_id);
        tracing::info!(run_id = %run.run_id, "pipeline with id {} completed", run.run_id);

        Ok(RunSummary {
            run_id: run.run_id,
            rows,
            passed: report.passed,
            persisted,
        })
    }
}

fn advance(state: &mut RunState, next: RunState, run_id: &str) {
    tracing::debug!(run_id, from = %state, to = %next, "run state");
    *state = next;
}
