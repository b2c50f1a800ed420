//! Application configuration loaded once at startup
//!
//! The YAML document has two sections:
//!
//! ```yaml
//! pipeline:
//!   destination_table: sales
//!   data_quality: data_quality
//!   urls:
//!     chocolate_sales: https://example.com/sales.csv
//! api:
//!   version: /v1
//!   rate_limits:
//!     per_second: 2
//!     per_minute: 10
//!   admin:
//!     username: admin
//!     password: secret
//! ```
//!
//! `pipeline.database`, `pipeline.data_dir`, `api.host` and `api.port` are
//! optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sales_data_api::{AdminCredentials, ApiConfig};
use sales_data_store::validate_identifier;
use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Root of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Ingestion settings
    pub pipeline: PipelineSection,

    /// Read API settings
    pub api: ApiSection,
}

/// `pipeline` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineSection {
    /// Table receiving the cleaned records
    pub destination_table: String,

    /// Table receiving the data-quality metrics
    pub data_quality: String,

    /// Named remote sources, processed in name order
    #[serde(default)]
    pub urls: BTreeMap<String, String>,

    /// SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Directory scanned in local mode
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// `api` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiSection {
    /// Route prefix, e.g. `/v1`
    pub version: String,

    /// Per-caller request limits
    pub rate_limits: RateLimits,

    /// The single admin identity
    pub admin: AdminSection,

    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

/// `api.rate_limits` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimits {
    /// Requests allowed per second
    pub per_second: u32,

    /// Requests allowed per minute
    pub per_minute: u32,
}

/// `api.admin` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminSection {
    /// Admin username
    pub username: String,

    /// Admin password
    pub password: String,
}

fn default_database() -> PathBuf {
    PathBuf::from("db/pipeline.db")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    12000
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse and validate a configuration document
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| PipelineError::Config(format!("failed to parse YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for table in [&self.pipeline.destination_table, &self.pipeline.data_quality] {
            validate_identifier(table).map_err(|e| PipelineError::Config(e.to_string()))?;
        }
        if self.pipeline.destination_table == self.pipeline.data_quality {
            return Err(PipelineError::Config(
                "destination_table and data_quality must name different tables".into(),
            ));
        }
        if self.api.rate_limits.per_second == 0 || self.api.rate_limits.per_minute == 0 {
            return Err(PipelineError::Config("rate limits must be positive".into()));
        }
        if self.api.admin.username.is_empty() {
            return Err(PipelineError::Config("admin username must not be empty".into()));
        }
        Ok(())
    }

    /// Settings of the read API
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            version: self.api.version.clone(),
            default_table: self.pipeline.destination_table.clone(),
            per_second: self.api.rate_limits.per_second,
            per_minute: self.api.rate_limits.per_minute,
            admin: AdminCredentials {
                username: self.api.admin.username.clone(),
                password: self.api.admin.password.clone(),
            },
            host: self.api.host.clone(),
            port: self.api.port,
        }
    }
}
