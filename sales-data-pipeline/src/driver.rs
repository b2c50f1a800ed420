//! Source iteration and process lifecycle
//!
//! The driver runs the orchestrator once per configured source, one source at a
//! time. A failing source is logged and the remaining sources still run. Once
//! every source has been processed the read API is served.

use std::path::Path;
use std::sync::Arc;

use sales_data_readers::{Loader, Locator};
use sales_data_store::Store;

use crate::config::AppConfig;
use crate::error::{PipelineError, Result};
use crate::fetch::Fetcher;
use crate::orchestrator::{Destinations, Orchestrator, RunSummary};
use crate::persist::Persister;
use crate::registry::SchemaRegistry;

/// Which sources a process runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every URL in `pipeline.urls`, in name order
    Remote,
    /// Every file in `pipeline.data_dir`, in file-name order
    Local,
    /// No pipeline runs, serve only
    ApiOnly,
}

/// Outcome of one source
#[derive(Debug)]
pub struct SourceOutcome {
    /// The source
    pub locator: Locator,

    /// Its run summary or the error that ended the run
    pub result: Result<RunSummary>,
}

/// Build the orchestrator described by `config`
pub fn orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let registry = SchemaRegistry::new()?;
    let fetcher = Fetcher::new(Loader::new(), Arc::clone(registry.input()));
    let persister = Persister::new(Store::new(&config.pipeline.database));

    Ok(Orchestrator::new(
        fetcher,
        Arc::clone(registry.output()),
        persister,
        Destinations {
            records: config.pipeline.destination_table.clone(),
            metrics: config.pipeline.data_quality.clone(),
        },
    ))
}

/// Files directly inside `dir`, sorted by file name
pub fn local_sources(dir: &Path) -> Result<Vec<Locator>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths
        .into_iter()
        .map(|p| Locator::new(p.to_string_lossy().into_owned()))
        .collect())
}

/// Sources of `mode`
pub fn sources(config: &AppConfig, mode: Mode) -> Result<Vec<Locator>> {
    match mode {
        Mode::Remote => Ok(config
            .pipeline
            .urls
            .values()
            .map(|url| Locator::new(url.as_str()))
            .collect()),
        Mode::Local => local_sources(&config.pipeline.data_dir),
        Mode::ApiOnly => Ok(Vec::new()),
    }
}

/// Run every source in order, isolating failures
pub async fn run_sources(orchestrator: &Orchestrator, sources: Vec<Locator>) -> Vec<SourceOutcome> {
    let mut outcomes = Vec::with_capacity(sources.len());

    for locator in sources {
        let result = orchestrator.run(&locator).await;
        match &result {
            Ok(summary) => tracing::info!(
                %locator,
                run_id = %summary.run_id,
                rows = summary.rows,
                persisted = summary.persisted,
                "source processed"
            ),
            Err(e) => tracing::error!(
                %locator,
                error = %e,
                "there was a problem processing the source"
            ),
        }
        outcomes.push(SourceOutcome { locator, result });
    }

    outcomes
}

/// Process the sources of `mode`, then serve the read API until the process stops
pub async fn run(config: &AppConfig, mode: Mode) -> Result<()> {
    if mode != Mode::ApiOnly {
        let orchestrator = orchestrator(config)?;
        let sources = sources(config, mode)?;
        tracing::info!(sources = sources.len(), ?mode, "starting pipeline runs");

        let outcomes = run_sources(&orchestrator, sources).await;
        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!(processed = outcomes.len(), failed, "pipeline runs finished");
    }

    let store = Store::new(&config.pipeline.database);
    sales_data_api::serve(config.api_config(), store)
        .await
        .map_err(PipelineError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_sources_sorted_and_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.csv", "c.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let names: Vec<String> = local_sources(dir.path())
            .unwrap()
            .iter()
            .map(|l| Path::new(l.as_str()).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.json", "c.txt"]);
    }

    #[test]
    fn test_missing_data_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(local_sources(&dir.path().join("absent")), Err(PipelineError::Io(_))));
    }
}
