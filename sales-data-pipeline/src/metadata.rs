//! Provenance of one pipeline run

use chrono::{DateTime, Utc};
use sales_data_core::Value;
use sales_data_readers::{FileFormat, Locator};
use uuid::Uuid;

/// Format of persisted timestamps; lexical order is chronological
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Identity of one run, stamped onto every persisted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    /// Unique token of the run, 32 hex digits
    pub run_id: String,

    /// When fetching started
    pub start_time: DateTime<Utc>,

    /// Base name of the source without extension
    pub file_name: String,

    /// Format tag of the source
    pub file_type: FileFormat,

    /// The locator as given
    pub source: String,
}

impl RunMetadata {
    /// Open a new run for `locator`, capturing the current time
    pub fn start(locator: &Locator, file_type: FileFormat) -> Self {
        Self {
            run_id: Uuid::new_v4().simple().to_string(),
            start_time: Utc::now(),
            file_name: locator.file_stem().to_string(),
            file_type,
            source: locator.as_str().to_string(),
        }
    }

    /// The start time as persisted in `created_at` and `modified_at`
    pub fn timestamp(&self) -> String {
        self.start_time.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Stamp columns in persisted order, as name and constant value
    pub fn stamp(&self) -> Vec<(&'static str, Value)> {
        let timestamp = self.timestamp();
        vec![
            ("run_id", Value::String(self.run_id.clone())),
            ("file_name", Value::String(self.file_name.clone())),
            ("file_type", Value::String(self.file_type.as_str().to_string())),
            ("source", Value::String(self.source.clone())),
            ("created_at", Value::String(timestamp.clone())),
            ("modified_at", Value::String(timestamp)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_derives_source_identity() {
        let locator = Locator::new("https://host/files/chocolate_sales.csv?token=abc");
        let run = RunMetadata::start(&locator, FileFormat::Csv);

        assert_eq!(run.run_id.len(), 32);
        assert!(run.run_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(run.file_name, "chocolate_sales");
        assert_eq!(run.source, locator.as_str());
    }

    #[test]
    fn test_run_ids_are_unique() {
        let locator = Locator::new("data/sales.json");
        let a = RunMetadata::start(&locator, FileFormat::Json);
        let b = RunMetadata::start(&locator, FileFormat::Json);
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_stamp_order_and_timestamp_format() {
        let run = RunMetadata::start(&Locator::new("data/sales.csv"), FileFormat::Csv);
        let stamp = run.stamp();

        let names: Vec<&str> = stamp.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["run_id", "file_name", "file_type", "source", "created_at", "modified_at"]
        );
        assert_eq!(stamp[2].1, Value::String("csv".into()));

        // YYYY-MM-DD HH:MM:SS.ffffff
        let timestamp = run.timestamp();
        assert_eq!(timestamp.len(), 26);
        assert_eq!(&timestamp[10..11], " ");
        assert_eq!(stamp[4].1, stamp[5].1);
    }
}
