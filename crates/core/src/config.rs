//! Configuration for a sync run.
//!
//! Settings come from command-line flags (see the CLI crate) layered over an
//! optional TOML file. A flag that is present wins; otherwise the file value is
//! used; otherwise the built-in default applies. `gitlab.token_env` is only
//! looked up when no token came from the command line, and `--no-dry-run`
//! overrides a file's `dry_run = true`.
//!
//! ```toml
//! [gitlab]
//! url = "https://gitlab.com"
//! token_env = "GITLAB_TOKEN"
//!
//! [sync]
//! source = "group/project-a"
//! target = "group/project-b"
//! dry_run = false
//! output = "env-sync-dry-run.json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::report::DEFAULT_REPORT_PATH;

// ---------------------------------------------------------------------------
// File configuration
// ---------------------------------------------------------------------------

/// Contents of an optional TOML configuration file. Every field may be
/// omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub gitlab: GitLabSection,

    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitLabSection {
    /// Instance base URL, e.g. `https://gitlab.com`.
    pub url: Option<String>,

    /// Inline token. Prefer `token_env`.
    pub token: Option<String>,

    /// Name of the environment variable holding the token.
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSection {
    pub source: Option<String>,
    pub target: Option<String>,
    pub dry_run: Option<bool>,
    pub output: Option<PathBuf>,
}

impl FileConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: FileConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Replace `gitlab.token` with the value of the variable named by
    /// `gitlab.token_env`, if one is named.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref env_name) = self.gitlab.token_env {
            match std::env::var(env_name) {
                Ok(val) if !val.is_empty() => self.gitlab.token = Some(val),
                _ => {
                    return Err(ConfigError::EnvVarMissing {
                        var: env_name.clone(),
                        field: "gitlab.token_env".into(),
                    })
                }
            }
        }
        Ok(())
    }

}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gitlab_url: Option<String>,
    pub token: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    /// `Some(false)` forces a live run even if the file sets `dry_run = true`.
    pub dry_run: Option<bool>,
    pub output: Option<PathBuf>,
}

/// Fully merged settings for one run.
#[derive(Clone)]
pub struct SyncConfig {
    pub gitlab_url: String,
    pub token: String,
    pub source: String,
    pub target: String,
    pub dry_run: bool,
    pub output: PathBuf,
}

impl SyncConfig {
    /// Merge flags over an optional file config.
    pub fn from_sources(overrides: Overrides, file: Option<FileConfig>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            gitlab_url: pick(overrides.gitlab_url, file.gitlab.url),
            token: pick(overrides.token, file.gitlab.token),
            source: pick(overrides.source, file.sync.source),
            target: pick(overrides.target, file.sync.target),
            dry_run: overrides.dry_run.or(file.sync.dry_run).unwrap_or(false),
            output: overrides
                .output
                .or(file.sync.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH)),
        }
    }

    /// Like [`SyncConfig::from_sources`], but resolves the file's `token_env`
    /// first. The lookup is skipped when the flags already carry a token, so an
    /// unset variable only matters when the file is the token's sole source.
    pub fn resolve(overrides: Overrides, file: Option<FileConfig>) -> Result<Self, ConfigError> {
        let has_token = overrides.token.as_deref().is_some_and(|t| !t.is_empty());
        let file = match file {
            Some(mut file) if !has_token => {
                file.resolve_env_vars()?;
                Some(file)
            }
            other => other,
        };
        Ok(Self::from_sources(overrides, file))
    }

    /// Check that all four required settings are non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("gitlab-url", &self.gitlab_url),
            ("token", &self.token),
            ("source", &self.source),
            ("target", &self.target),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(ConfigError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Instance URL with trailing `/` characters removed.
    pub fn normalized_url(&self) -> &str {
        self.gitlab_url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("gitlab_url", &self.gitlab_url)
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("dry_run", &self.dry_run)
            .field("output", &self.output)
            .finish()
    }
}

fn pick(flag: Option<String>, file: Option<String>) -> String {
    flag.filter(|v| !v.is_empty())
        .or(file)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn full_overrides() -> Overrides {
        Overrides {
            gitlab_url: Some("https://gitlab.example.com/".into()),
            token: Some("glpat-123".into()),
            source: Some("group/a".into()),
            target: Some("group/b".into()),
            dry_run: None,
            output: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_sources(full_overrides(), None);
        assert!(!config.dry_run);
        assert_eq!(config.output, PathBuf::from("env-sync-dry-run.json"));
        config.validate().unwrap();
    }

    #[test]
    fn test_normalized_url_strips_all_trailing_slashes() {
        let mut config = SyncConfig::from_sources(full_overrides(), None);
        config.gitlab_url = "https://gitlab.example.com///".into();
        assert_eq!(config.normalized_url(), "https://gitlab.example.com");
    }

    #[test]
    fn test_validate_names_each_missing_field() {
        let cases: [(&str, fn(&mut Overrides)); 4] = [
            ("gitlab-url", |o| o.gitlab_url = None),
            ("token", |o| o.token = Some(String::new())),
            ("source", |o| o.source = None),
            ("target", |o| o.target = Some(String::new())),
        ];
        for (field, clear) in cases {
            let mut overrides = full_overrides();
            clear(&mut overrides);
            let config = SyncConfig::from_sources(overrides, None);
            assert!(
                matches!(config.validate(), Err(ConfigError::MissingField(f)) if f == field),
                "expected missing {field}"
            );
        }
    }

    #[test]
    fn test_whitespace_values_are_not_missing() {
        let mut overrides = full_overrides();
        overrides.source = Some(" ".into());
        let config = SyncConfig::from_sources(overrides, None);
        config.validate().unwrap();
        assert_eq!(config.source, " ");
    }

    #[test]
    fn test_no_dry_run_flag_beats_file() {
        let file: FileConfig = toml::from_str("[sync]\ndry_run = true\n").unwrap();

        let config = SyncConfig::from_sources(full_overrides(), Some(file.clone()));
        assert!(config.dry_run);

        let overrides = Overrides {
            dry_run: Some(false),
            ..full_overrides()
        };
        let config = SyncConfig::from_sources(overrides, Some(file));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_resolve_skips_token_env_when_token_flag_given() {
        let file: FileConfig =
            toml::from_str("[gitlab]\ntoken_env = \"ENV_SYNC_TEST_NEVER_SET\"\n").unwrap();

        let config = SyncConfig::resolve(full_overrides(), Some(file.clone())).unwrap();
        assert_eq!(config.token, "glpat-123");

        let overrides = Overrides {
            token: None,
            ..full_overrides()
        };
        let result = SyncConfig::resolve(overrides, Some(file));
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarMissing { ref var, .. }) if var == "ENV_SYNC_TEST_NEVER_SET"
        ));
    }

    #[test]
    fn test_flags_override_file() {
        let file: FileConfig = toml::from_str(
            r#"
[gitlab]
url = "https://file.example.com"
token = "file-token"

[sync]
source = "file/source"
target = "file/target"
dry_run = true
output = "from-file.json"
"#,
        )
        .unwrap();

        let overrides = Overrides {
            source: Some("flag/source".into()),
            ..Overrides::default()
        };
        let config = SyncConfig::from_sources(overrides, Some(file));
        assert_eq!(config.gitlab_url, "https://file.example.com");
        assert_eq!(config.token, "file-token");
        assert_eq!(config.source, "flag/source");
        assert_eq!(config.target, "file/target");
        assert!(config.dry_run);
        assert_eq!(config.output, PathBuf::from("from-file.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env-sync.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"[sync]\nsource = \"g/a\"\n").unwrap();

        let config = FileConfig::load_from_file(&path).unwrap();
        assert_eq!(config.sync.source.as_deref(), Some("g/a"));
        assert!(config.gitlab.url.is_none());
    }

    #[test]
    fn test_file_not_found() {
        let result = FileConfig::load_from_file("/nonexistent/env-sync.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[gitlab\nurl = ").unwrap();
        let result = FileConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_resolve_env_vars() {
        std::env::set_var("ENV_SYNC_TEST_TOKEN", "glpat-from-env");
        let mut config: FileConfig =
            toml::from_str("[gitlab]\ntoken_env = \"ENV_SYNC_TEST_TOKEN\"\n").unwrap();
        config.resolve_env_vars().unwrap();
        assert_eq!(config.gitlab.token.as_deref(), Some("glpat-from-env"));
    }

    #[test]
    fn test_resolve_env_vars_missing() {
        let mut config: FileConfig =
            toml::from_str("[gitlab]\ntoken_env = \"ENV_SYNC_TEST_UNSET_TOKEN\"\n").unwrap();
        let result = config.resolve_env_vars();
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarMissing { ref var, .. }) if var == "ENV_SYNC_TEST_UNSET_TOKEN"
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = SyncConfig::from_sources(full_overrides(), None);
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("glpat-123"));
        assert!(dbg.contains("<redacted>"));
    }
}
