//! GitLab REST API access for gitlab-env-sync.

pub mod client;

pub use client::{encode_project_path, GitLabClient};
