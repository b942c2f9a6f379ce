//! Dry-run report: a snapshot of what a live run would transfer.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ReportError;
use crate::models::EnvironmentVariable;

/// Default file name for the dry-run report.
pub const DEFAULT_REPORT_PATH: &str = "env-sync-dry-run.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    #[serde(with = "rfc3339_seconds")]
    pub timestamp: DateTime<Utc>,
    pub source_project: String,
    pub target_project: String,
    pub variables: Vec<EnvironmentVariable>,
}

impl TransferReport {
    /// Snapshot `variables` as of now.
    pub fn new(
        source_project: impl Into<String>,
        target_project: impl Into<String>,
        variables: Vec<EnvironmentVariable>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            source_project: source_project.into(),
            target_project: target_project.into(),
            variables,
        }
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(ReportError::Serialize)
    }

    /// Write the report to `path` in a single write, replacing any existing
    /// file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let path = path.as_ref();
        let mut json = self.to_json_pretty()?;
        json.push('\n');
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            count = self.variables.len(),
            "wrote dry run report"
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let report: TransferReport =
            serde_json::from_str(&contents).map_err(ReportError::Parse)?;
        debug!(path = %path.display(), "loaded dry run report");
        Ok(report)
    }
}

/// RFC 3339 at second precision with a `Z` suffix, e.g.
/// `2024-05-01T12:00:00Z`.
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for TransferReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} variable(s) from {} to {} at {}",
            self.variables.len(),
            self.source_project,
            self.target_project,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
