//! gitlab-env-sync command-line tool.
//!
//! Copies the CI/CD variables of one GitLab project into another, or with
//! `--dry-run` writes what would be copied to a JSON report instead.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

use gitlab_env_sync_core::config::{FileConfig, Overrides, SyncConfig};
use gitlab_env_sync_core::report::DEFAULT_REPORT_PATH;
use gitlab_env_sync_core::{SyncEngine, SyncOutcome};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Copy CI/CD variables from one GitLab project to another.
#[derive(Parser, Debug)]
#[command(name = "gitlab-env-sync", version, about)]
struct Cli {
    /// GitLab instance URL (e.g., https://gitlab.com).
    #[arg(long, env = "GITLAB_URL", value_name = "URL")]
    gitlab_url: Option<String>,

    /// GitLab access token.
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Source project path (e.g., group/project).
    #[arg(long, value_name = "PATH")]
    source: Option<String>,

    /// Target project path (e.g., group/project).
    #[arg(long, value_name = "PATH")]
    target: Option<String>,

    /// Perform a dry run and write output to file.
    #[arg(long, overrides_with = "no_dry_run")]
    dry_run: bool,

    /// Force a live run even if the config file sets dry_run.
    #[arg(long, overrides_with = "dry_run")]
    no_dry_run: bool,

    /// Output file for dry run [default: env-sync-dry-run.json].
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Optional TOML file supplying any of the settings above.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

const EXAMPLE_USAGE: &str = "\
Example usage:
  gitlab-env-sync \\
    --gitlab-url https://gitlab.com \\
    --token your-token \\
    --source group/project-a \\
    --target group/project-b";

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = build_config(&cli)?;

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        return Ok(ExitCode::FAILURE);
    }

    let engine = SyncEngine::new(config).context("failed to start sync")?;
    let outcome = engine.run().await?;
    let config = engine.config();

    match outcome {
        SyncOutcome::DryRun { output, count } => {
            println!(
                "Dry run completed. Found {} variables to transfer, report written to {}",
                count,
                output.display()
            );
        }
        SyncOutcome::Transferred(summary) => {
            println!(
                "Transfer completed. Successfully transferred {} variables",
                summary.success_ratio()
            );
            println!("  {} -> {}", config.source, config.target);
            if !summary.is_complete() {
                println!();
                println!("Failed variables:");
                for (key, message) in &summary.failures {
                    println!("  FAILED {:<30} {}", key, message);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn build_config(cli: &Cli) -> Result<SyncConfig> {
    let file = match cli.config {
        Some(ref path) => Some(
            FileConfig::load_from_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        ),
        None => None,
    };

    let dry_run = match (cli.dry_run, cli.no_dry_run) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    };

    let overrides = Overrides {
        gitlab_url: cli.gitlab_url.clone(),
        token: cli.token.clone(),
        source: cli.source.clone(),
        target: cli.target.clone(),
        dry_run,
        output: cli.output.clone(),
    };

    SyncConfig::resolve(overrides, file).context("failed to resolve configuration")
}

fn print_usage() {
    let mut cmd = Cli::command();
    // Help goes to stdout; nothing useful to do if that fails.
    let _ = cmd.print_help();
    println!();
    println!("{}", EXAMPLE_USAGE);
    println!();
    println!("Dry-run reports default to {}.", DEFAULT_REPORT_PATH);
}
