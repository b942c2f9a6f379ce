//! GitLab REST API client for project-level CI/CD variables.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, info, instrument};

use crate::errors::GitLabError;
use crate::models::EnvironmentVariable;

/// Path prefix of the v4 REST API, relative to the instance URL.
pub const API_PREFIX: &str = "api/v4";

/// Per-request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const PRIVATE_TOKEN: HeaderName = HeaderName::from_static("private-token");

/// Percent-encode a `group/subgroup/project` path into a single URL path
/// segment (`group%2Fsubgroup%2Fproject`).
pub fn encode_project_path(project: &str) -> String {
    urlencoding::encode(project).into_owned()
}

/// Asynchronous GitLab REST API client bound to one instance and token.
#[derive(Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitLabClient {
    /// Create a client using [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: impl Into<String>, token: &str) -> Result<Self, GitLabError> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, GitLabError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut token_value = HeaderValue::from_str(token)
            .map_err(|_| GitLabError::InvalidHeader("PRIVATE-TOKEN"))?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PRIVATE_TOKEN, token_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gitlab-env-sync/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        info!(base_url = %base_url, timeout_secs = timeout.as_secs_f64(), "created GitLabClient");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/api/v4/projects/{encoded path}/variables`
    pub fn variables_url(&self, project: &str) -> String {
        format!(
            "{}/{}/projects/{}/variables",
            self.base_url,
            API_PREFIX,
            encode_project_path(project)
        )
    }

    /// List every variable defined on `project`, in the order the API returns
    /// them.
    #[instrument(skip(self))]
    pub async fn list_variables(
        &self,
        project: &str,
    ) -> Result<Vec<EnvironmentVariable>, GitLabError> {
        let url = self.variables_url(project);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GitLabError::NotFound {
                project: project.to_string(),
            });
        }
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(GitLabError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let variables: Vec<EnvironmentVariable> =
            serde_json::from_str(&body).map_err(GitLabError::Decode)?;
        debug!(count = variables.len(), "fetched variables");
        Ok(variables)
    }

    /// Create `variable` on `project`.
    ///
    /// With `dry_run` set this returns `Ok(())` without touching the network.
    #[instrument(skip(self, variable), fields(key = %variable.key))]
    pub async fn create_variable(
        &self,
        project: &str,
        variable: &EnvironmentVariable,
        dry_run: bool,
    ) -> Result<(), GitLabError> {
        if dry_run {
            debug!("dry run, skipping create");
            return Ok(());
        }

        let url = self.variables_url(project);
        let data = serde_json::to_vec(variable).map_err(GitLabError::Encode)?;
        let resp = self.http.post(&url).body(data).send().await?;
        let status = resp.status();

        if status != StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(GitLabError::CreateFailed {
                key: variable.key.clone(),
                status: status.as_u16(),
                body,
            });
        }

        debug!("created variable");
        Ok(())
    }
}
