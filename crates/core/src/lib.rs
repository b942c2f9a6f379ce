//! gitlab-env-sync core library.
//!
//! Copies project-level CI/CD variables from one GitLab project to another:
//! configuration, the REST client, the dry-run report, and the sync engine
//! that ties them together.

pub mod config;
pub mod errors;
pub mod gitlab;
pub mod models;
pub mod report;
pub mod sync_engine;

// Re-exports for convenience.
pub use config::SyncConfig;
pub use gitlab::GitLabClient;
pub use models::{EnvironmentVariable, TransferSummary};
pub use report::TransferReport;
pub use sync_engine::{SyncEngine, SyncOutcome};
