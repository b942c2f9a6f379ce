//! The sync driver: list the source project's variables, then either write a
//! dry-run report or replay each variable against the target project.
//!
//! A run is strictly sequential. Only configuration errors, a failed source
//! listing, and a failed report write abort it; a failed creation is logged
//! and the loop moves on to the next variable. Nothing is rolled back.

use std::path::PathBuf;

use tracing::{error, info};

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::gitlab::GitLabClient;
use crate::models::{EnvironmentVariable, TransferSummary};
use crate::report::TransferReport;

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A report was written; no target-side calls were made.
    DryRun { output: PathBuf, count: usize },
    /// Variables were replayed against the target project.
    Transferred(TransferSummary),
}

pub struct SyncEngine {
    config: SyncConfig,
    client: GitLabClient,
}

impl SyncEngine {
    /// Validate `config` and build a client bound to its normalized URL.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let client = GitLabClient::new(config.normalized_url(), &config.token)
            .map_err(SyncError::Client)?;
        Ok(Self::with_client(config, client))
    }

    /// Use a pre-built client. `config` is assumed to be validated.
    pub fn with_client(config: SyncConfig, client: GitLabClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub async fn run(&self) -> Result<SyncOutcome, SyncError> {
        let source = &self.config.source;

        info!(
            base_url = %self.client.base_url(),
            project = %source,
            "fetching variables from source project"
        );
        let variables = self
            .client
            .list_variables(source)
            .await
            .map_err(SyncError::Listing)?;

        if self.config.dry_run {
            return self.write_dry_run(variables);
        }

        let summary = self.transfer(&variables).await;
        Ok(SyncOutcome::Transferred(summary))
    }

    fn write_dry_run(&self, variables: Vec<EnvironmentVariable>) -> Result<SyncOutcome, SyncError> {
        let output = self.config.output.clone();
        info!(output = %output.display(), "performing dry run");

        let count = variables.len();
        let report = TransferReport::new(&self.config.source, &self.config.target, variables);
        report.write_to(&output)?;

        info!(count, "dry run completed, report covers {}", report);
        Ok(SyncOutcome::DryRun { output, count })
    }

    async fn transfer(&self, variables: &[EnvironmentVariable]) -> TransferSummary {
        let target = &self.config.target;
        info!(
            count = variables.len(),
            source = %self.config.source,
            target = %target,
            "starting transfer"
        );

        let mut summary = TransferSummary::new(variables.len());
        for variable in variables {
            info!(key = %variable.key, "transferring variable");
            match self.client.create_variable(target, variable, false).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    error!(key = %variable.key, error = %e, "error transferring variable");
                    summary.failures.push((variable.key.clone(), e.to_string()));
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            total = summary.total,
            "transfer completed, successfully transferred {} variables",
            summary.success_ratio()
        );
        summary
    }
}
