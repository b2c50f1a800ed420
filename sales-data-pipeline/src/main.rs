use std::path::PathBuf;

use clap::Parser;
use sales_data_pipeline::{driver, logging, AppConfig, Mode};

#[derive(Parser)]
#[command(
    name = "sales-data",
    version,
    about = "Ingest sales records into SQLite and serve them over HTTP"
)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Run the pipeline on every file in `pipeline.data_dir` instead of the configured URLs
    #[arg(long, conflicts_with = "api_only")]
    use_local: bool,

    /// Skip the pipeline and only serve the API
    #[arg(long)]
    api_only: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "SALES_DATA_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let config = AppConfig::load(&cli.config)?;
    let mode = if cli.api_only {
        Mode::ApiOnly
    } else if cli.use_local {
        Mode::Local
    } else {
        Mode::Remote
    };

    driver::run(&config, mode).await?;
    Ok(())
}
