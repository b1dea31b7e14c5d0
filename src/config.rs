//! Configuration loading from bayesgpt.toml and pyproject.toml.
//!
//! Follows conventions from ruff, black, mypy for familiarity:
//! - Standalone bayesgpt.toml in the working directory
//! - `[tool.bayesgpt]` section in pyproject.toml as fallback
//!
//! Environment variables override the file for secrets and endpoints.
//!
//! ## Example
//!
//! ```toml
//! model = "gpt-4o"
//! base-url = "https://api.openai.com/v1"
//! timeout-secs = 60
//! cache = "redb"
//! cache-dir = ".bayesgpt.cache"
//! heartbeat = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cache::CacheBackend;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CACHE_DIR: &str = ".bayesgpt.cache";
/// Daily, enough to keep a free-tier remote store from being archived.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// bayesgpt configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    /// Chat model used for estimation.
    pub model: String,

    /// OpenAI-compatible API base URL.
    pub base_url: String,

    pub api_key: Option<String>,

    /// Sent as `OpenAI-Organization` when set.
    pub organization: Option<String>,

    /// HTTP timeout for the LLM and KV requests.
    pub timeout_secs: u64,

    /// Explicit backend. When unset, see `cache_backend()`.
    pub cache: Option<CacheBackend>,

    /// Directory of the local redb cache.
    pub cache_dir: PathBuf,

    pub kv_url: Option<String>,

    pub kv_token: Option<String>,

    /// Periodically touch the cache so remote stores stay warm.
    pub heartbeat: bool,

    pub heartbeat_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            organization: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            kv_url: None,
            kv_token: None,
            heartbeat: false,
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
        }
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    organization: Option<String>,
    timeout_secs: Option<u64>,
    cache: Option<CacheBackend>,
    cache_dir: Option<String>,
    kv_url: Option<String>,
    kv_token: Option<String>,
    heartbeat: Option<bool>,
    heartbeat_interval_secs: Option<u64>,
}

/// Wrapper for pyproject.toml structure.
#[derive(Debug, Deserialize)]
struct PyProject {
    tool: Option<PyProjectTool>,
}

#[derive(Debug, Deserialize)]
struct PyProjectTool {
    bayesgpt: Option<RawConfig>,
}

impl Config {
    /// Load configuration from the given directory.
    ///
    /// Search order:
    /// 1. bayesgpt.toml in directory
    /// 2. pyproject.toml [tool.bayesgpt] in directory
    /// 3. Walk up to find pyproject.toml (like ruff)
    /// 4. Default config if nothing found
    ///
    /// A file that exists but fails to parse is an error rather than a
    /// silent fallback.
    pub fn load(directory: &Path) -> Result<Self> {
        let bayesgpt_toml = directory.join("bayesgpt.toml");
        if bayesgpt_toml.exists() {
            return Self::load_bayesgpt_toml(&bayesgpt_toml);
        }

        let mut current = Some(directory);
        while let Some(dir) = current {
            let pyproject = dir.join("pyproject.toml");
            if pyproject.exists() {
                if let Some(config) = Self::load_pyproject(&pyproject)? {
                    return Ok(config);
                }
            }
            current = dir.parent();
        }

        Ok(Self::default())
    }

    fn load_bayesgpt_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self::from_raw(raw, path.to_path_buf()))
    }

    /// `None` when the file has no `[tool.bayesgpt]` section.
    fn load_pyproject(path: &Path) -> Result<Option<Self>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let pyproject: PyProject = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(pyproject
            .tool
            .and_then(|tool| tool.bayesgpt)
            .map(|raw| Self::from_raw(raw, path.to_path_buf())))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        let defaults = Self::default();
        Self {
            source: Some(source),
            model: raw.model.unwrap_or(defaults.model),
            base_url: raw.base_url.unwrap_or(defaults.base_url),
            api_key: raw.api_key,
            organization: raw.organization,
            timeout_secs: raw.timeout_secs.unwrap_or(defaults.timeout_secs),
            cache: raw.cache,
            cache_dir: raw.cache_dir.map(PathBuf::from).unwrap_or(defaults.cache_dir),
            kv_url: raw.kv_url,
            kv_token: raw.kv_token,
            heartbeat: raw.heartbeat.unwrap_or(defaults.heartbeat),
            heartbeat_interval_secs: raw
                .heartbeat_interval_secs
                .unwrap_or(defaults.heartbeat_interval_secs),
        }
    }

    /// Apply environment overrides from the process environment.
    pub fn with_process_env(self) -> Self {
        self.with_env(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides using `lookup` to read variables.
    /// Empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(org) = get("OPENAI_ORG_ID") {
            self.organization = Some(org);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = get("BAYESGPT_MODEL") {
            self.model = model;
        }
        if let Some(url) = get("KV_REST_API_URL") {
            self.kv_url = Some(url);
        }
        if let Some(token) = get("KV_REST_API_TOKEN") {
            self.kv_token = Some(token);
        }
        self
    }

    /// Effective backend: the explicit choice, else the remote store when
    /// its credentials are present, else the local redb store.
    pub fn cache_backend(&self) -> CacheBackend {
        match self.cache {
            Some(backend) => backend,
            None if self.kv_url.is_some() && self.kv_token.is_some() => CacheBackend::Kv,
            None => CacheBackend::Redb,
        }
    }

    /// Format config for verbose display. Secrets are never printed.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref source) = self.source {
            lines.push(format!("   Config: {}", source.display()));
        } else {
            lines.push("   Config: (defaults)".to_string());
        }

        lines.push(format!("   Model: {} via {}", self.model, self.base_url));
        lines.push(format!(
            "   API key: {}",
            if self.api_key.is_some() { "set" } else { "missing" }
        ));
        if let Some(ref org) = self.organization {
            lines.push(format!("   Organization: {}", org));
        }
        lines.push(format!("   Timeout: {}s", self.timeout_secs));

        let backend = self.cache_backend();
        match backend {
            CacheBackend::Kv => lines.push(format!(
                "   Cache: kv ({})",
                self.kv_url.as_deref().unwrap_or("no url")
            )),
            CacheBackend::Redb => {
                lines.push(format!("   Cache: redb ({})", self.cache_dir.display()))
            }
            CacheBackend::Memory => lines.push("   Cache: memory".to_string()),
        }

        if self.heartbeat {
            lines.push(format!("   Heartbeat: every {}s", self.heartbeat_interval_secs));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.cache_backend(), CacheBackend::Redb);
        assert!(!config.heartbeat);
    }

    #[test]
    fn test_bayesgpt_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bayesgpt.toml"),
            "model = \"gpt-4o-mini\"\ncache = \"memory\"\ntimeout-secs = 5\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.cache_backend(), CacheBackend::Memory);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.source.is_some());
    }

    #[test]
    fn test_pyproject_walk_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"x\"\n\n[tool.bayesgpt]\nheartbeat = true\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::load(&nested).unwrap();
        assert!(config.heartbeat);
        assert_eq!(config.heartbeat_interval_secs, DEFAULT_HEARTBEAT_INTERVAL_SECS);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bayesgpt.toml"), "cache = \"sqlite\"\n").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("BAYESGPT_MODEL", "gpt-4.1"),
            ("OPENAI_ORG_ID", ""),
            ("KV_REST_API_URL", "https://kv.example.com"),
            ("KV_REST_API_TOKEN", "secret-token"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4.1");
        assert!(config.organization.is_none());
        assert_eq!(config.cache_backend(), CacheBackend::Kv);
    }

    #[test]
    fn test_summary_hides_secrets() {
        let config = Config {
            api_key: Some("sk-very-secret".into()),
            kv_url: Some("https://kv.example.com".into()),
            kv_token: Some("token-very-secret".into()),
            ..Config::default()
        };
        let summary = config.display_summary();
        assert!(summary.contains("API key: set"));
        assert!(summary.contains("kv.example.com"));
        assert!(!summary.contains("very-secret"));
    }
}
