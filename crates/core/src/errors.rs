//! Error types for the gitlab-env-sync core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and
//! [`SyncError`] collects the ones that end a run.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Sync errors (fatal)
// ---------------------------------------------------------------------------

/// Errors that abort a sync run.
///
/// Per-variable creation failures are not represented here; the driver records
/// them in the transfer summary and keeps going.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listing the source project's variables failed.
    #[error("error getting variables from source project: {0}")]
    Listing(#[source] GitLabError),

    /// Building the HTTP client failed.
    #[error("failed to initialize GitLab client: {0}")]
    Client(#[source] GitLabError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

// ---------------------------------------------------------------------------
// GitLab API errors
// ---------------------------------------------------------------------------

/// Errors from GitLab REST API interactions.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// HTTP-level transport error (connect, TLS, timeout, etc.).
    #[error("GitLab HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The project addressed by a listing call does not exist.
    #[error("project not found: {project}")]
    NotFound { project: String },

    /// Listing returned a status other than 200 or 404.
    #[error("failed to get variables: status code {status}, response: {body}")]
    RequestFailed { status: u16, body: String },

    /// Creation returned a status other than 201.
    #[error("failed to create variable {key}: status code {status}, response: {body}")]
    CreateFailed {
        key: String,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("GitLab response parse error: {0}")]
    Decode(#[source] serde_json::Error),

    /// A variable could not be serialized for the request body.
    #[error("failed to encode variable: {0}")]
    Encode(#[source] serde_json::Error),

    /// A header value contained characters HTTP does not allow.
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not supplied by any source.
    #[error("missing required setting: --{0}")]
    MissingField(&'static str),

    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A referenced environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing { var: String, field: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors from writing or reading the dry-run report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize dry run report: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse dry run report: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("dry run report I/O error at '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
