//! Configuration management.
//!
//! Credentials and endpoints are resolved exactly once at startup into an
//! immutable [`Config`] that is passed into every component; core logic
//! never reads the environment itself.
//!
//! Resolution order per key: process environment first, then a credentials
//! file. The file location is the `--env-file` flag, else `./.kibsync.env`,
//! else `~/.kibsync/env`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default credentials file inside a repository.
pub const ENV_FILE: &str = ".kibsync.env";

/// Manifest file name inside a repository.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Per-object file directory inside a repository.
pub const OBJECTS_DIR: &str = "objects";

/// How requests to the remote store are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// `Authorization: ApiKey <key>`
    ApiKey(String),
    /// `Authorization: Basic <base64(user:pass)>`
    Basic { username: String, password: String },
    /// No authorization header (anonymous access).
    None,
}

/// Summarization collaborator settings (chat-completions style API).
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

/// Immutable per-invocation configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote store, without a trailing slash.
    pub url: String,
    /// Space (named partition) the run operates in.
    pub space: String,
    pub auth: AuthMethod,
    /// Keep scratch files after a successful run (`--debug`).
    pub keep_temp: bool,
    /// Present only when an AI endpoint is configured.
    pub summarizer: Option<SummarizerConfig>,
}

impl Config {
    /// Resolve the configuration from the environment and the credentials
    /// file.
    ///
    /// `env_file` is the `--env-file` override; naming a missing file there
    /// is an error, while the default locations are simply skipped when
    /// absent. `space` is the `--space` override.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if an explicit env file is missing or
    /// `KIBANA_URL` cannot be resolved.
    pub fn resolve(
        env_file: Option<&Path>,
        space: Option<String>,
        keep_temp: bool,
    ) -> Result<Self> {
        let file_vars = match env_file {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "credentials file not found: {}",
                        path.display()
                    )));
                }
                parse_env_file(&std::fs::read_to_string(path)?)
            }
            None => default_env_file()
                .and_then(|p| std::fs::read_to_string(p).ok())
                .map(|content| parse_env_file(&content))
                .unwrap_or_default(),
        };

        let get = |key: &str| -> Option<String> {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file_vars.get(key).cloned())
        };

        let url = get("KIBANA_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .ok_or_else(|| Error::Config("KIBANA_URL is not set".to_string()))?;

        let space = space
            .or_else(|| get("KIBANA_SPACE"))
            .unwrap_or_else(|| "default".to_string());

        // Api key wins over basic credentials when both are present.
        let auth = if let Some(key) = get("KIBANA_APIKEY") {
            AuthMethod::ApiKey(key)
        } else if let (Some(username), Some(password)) =
            (get("KIBANA_USERNAME"), get("KIBANA_PASSWORD"))
        {
            AuthMethod::Basic { username, password }
        } else {
            AuthMethod::None
        };

        let summarizer = get("AI_ENDPOINT").map(|endpoint| SummarizerConfig {
            endpoint,
            api_key: get("AI_APIKEY"),
            model: get("AI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            temperature: get("AI_TEMPERATURE")
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.2),
        });

        Ok(Self {
            url,
            space,
            auth,
            keep_temp,
            summarizer,
        })
    }
}

/// First existing default credentials file: `./.kibsync.env`, then
/// `~/.kibsync/env`.
#[must_use]
pub fn default_env_file() -> Option<PathBuf> {
    let local = PathBuf::from(ENV_FILE);
    if local.exists() {
        return Some(local);
    }
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".kibsync").join("env"))
        .filter(|p| p.exists())
}

/// Parse KEY=VALUE lines.
///
/// `#` comments, blank lines, a leading `export `, and single or double
/// quotes around the value are all tolerated so the same file can be
/// `source`d from a shell.
fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            vars.insert(key.trim().to_string(), value.to_string());
        }
    }
    vars
}

/// Path of the manifest inside a repository.
#[must_use]
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Path of the per-object file directory inside a repository.
#[must_use]
pub fn objects_dir(root: &Path) -> PathBuf {
    root.join(OBJECTS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_file() {
        let vars = parse_env_file(
            "# comment\n\
             KIBANA_URL=https://kibana.example.com:5601\n\
             export KIBANA_SPACE=ops\n\
             KIBANA_APIKEY=\"abc==\"\n\
             KIBANA_PASSWORD='p#ss'\n\
             \n\
             not a pair\n",
        );

        assert_eq!(
            vars.get("KIBANA_URL").map(String::as_str),
            Some("https://kibana.example.com:5601")
        );
        assert_eq!(vars.get("KIBANA_SPACE").map(String::as_str), Some("ops"));
        assert_eq!(vars.get("KIBANA_APIKEY").map(String::as_str), Some("abc=="));
        assert_eq!(vars.get("KIBANA_PASSWORD").map(String::as_str), Some("p#ss"));
        assert!(!vars.contains_key("not a pair"));
    }

    #[test]
    fn test_explicit_env_file_must_exist() {
        let missing = Path::new("/nonexistent/kibsync.env");
        let result = Config::resolve(Some(missing), None, false);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let env_path = temp_dir.path().join("env");
        std::fs::write(
            &env_path,
            "KIBANA_URL=https://kibana.example.com/\nKIBANA_APIKEY=k1\n",
        )
        .unwrap();

        let config = Config::resolve(Some(&env_path), None, false).unwrap();

        // Trailing slash trimmed so path joins stay clean.
        assert_eq!(config.url, "https://kibana.example.com");
        assert_eq!(config.space, "default");
        assert_eq!(config.auth, AuthMethod::ApiKey("k1".to_string()));
        assert!(config.summarizer.is_none());
    }

    #[test]
    fn test_apikey_wins_over_basic() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let env_path = temp_dir.path().join("env");
        std::fs::write(
            &env_path,
            "KIBANA_URL=http://localhost:5601\n\
             KIBANA_APIKEY=k1\n\
             KIBANA_USERNAME=elastic\n\
             KIBANA_PASSWORD=changeme\n",
        )
        .unwrap();

        let config = Config::resolve(Some(&env_path), None, false).unwrap();
        assert_eq!(config.auth, AuthMethod::ApiKey("k1".to_string()));
    }

    #[test]
    fn test_space_flag_overrides_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let env_path = temp_dir.path().join("env");
        std::fs::write(
            &env_path,
            "KIBANA_URL=http://localhost:5601\nKIBANA_SPACE=ops\n",
        )
        .unwrap();

        let config =
            Config::resolve(Some(&env_path), Some("staging".to_string()), false).unwrap();
        assert_eq!(config.space, "staging");
    }

    #[test]
    fn test_summarizer_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let env_path = temp_dir.path().join("env");
        std::fs::write(
            &env_path,
            "KIBANA_URL=http://localhost:5601\n\
             AI_ENDPOINT=https://api.example.com/v1/chat/completions\n",
        )
        .unwrap();

        let config = Config::resolve(Some(&env_path), None, false).unwrap();
        let summarizer = config.summarizer.unwrap();
        assert_eq!(summarizer.model, "gpt-4o-mini");
        assert!((summarizer.temperature - 0.2).abs() < f32::EPSILON);
        assert!(summarizer.api_key.is_none());
    }
}
