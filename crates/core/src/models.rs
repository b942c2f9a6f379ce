//! Domain model types used throughout gitlab-env-sync.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Environment variable
// ---------------------------------------------------------------------------

/// A project-level CI/CD variable as exposed by
/// `GET /projects/:id/variables`.
///
/// Records are copied verbatim from source to target; no field is validated
/// or rewritten in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    /// `env_var` or `file`. Passed through untouched.
    pub variable_type: String,
    pub key: String,
    pub value: String,
    /// Only exposed to protected branches and tags.
    pub protected: bool,
    /// Redacted in job logs.
    pub masked: bool,
    /// Environment pattern, e.g. `*` or `production`.
    pub environment_scope: String,
}

// ---------------------------------------------------------------------------
// Transfer summary
// ---------------------------------------------------------------------------

/// Tally of a live transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSummary {
    /// Number of variables fetched from the source project.
    pub total: usize,
    /// Number of creation calls that returned 201.
    pub succeeded: usize,
    /// `(key, error message)` for each variable that failed, in list order.
    pub failures: Vec<(String, String)>,
}

impl TransferSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// `succeeded/total`, as printed in the final log line.
    pub fn success_ratio(&self) -> String {
        format!("{}/{}", self.succeeded, self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }
}
