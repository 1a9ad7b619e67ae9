//! API configuration.
//!
//! Values come from defaults, an optional YAML/JSON file, then environment
//! variables, each layer overriding the previous one.
//!
//! | Field | Variable | Default |
//! |---|---|---|
//! | `base_path` | `CRUDR_BASE_PATH` | `""` |
//! | `default_format` | `CRUDR_DEFAULT_FORMAT` | `json` |
//! | `default_limit` | `CRUDR_DEFAULT_LIMIT` | `100` |
//! | `max_limit` | `CRUDR_MAX_LIMIT` | `1000` |

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Prefix prepended to every resource URI.
    pub base_path: String,
    /// Response format when the request has no `format` parameter.
    pub default_format: String,
    /// Page size when the request has no `limit` parameter.
    pub default_limit: usize,
    /// Upper bound for `limit`; larger values are clamped.
    pub max_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            default_format: "json".to_string(),
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_env();
        config
    }

    /// Reads a YAML (`.yaml`/`.yml`) or JSON file, then applies the environment.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or the result is inconsistent.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let is_yaml = path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        let mut config: ApiConfig = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config {}", path.display()))?
        };
        config.merge_env();
        config.check()?;
        Ok(config)
    }

    /// Applies `CRUDR_*` variables. Unparsable numbers are ignored.
    pub fn merge_env(&mut self) {
        if let Ok(v) = env::var("CRUDR_BASE_PATH") {
            self.base_path = v;
        }
        if let Ok(v) = env::var("CRUDR_DEFAULT_FORMAT") {
            self.default_format = v;
        }
        if let Some(v) = env::var("CRUDR_DEFAULT_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.default_limit = v;
        }
        if let Some(v) = env::var("CRUDR_MAX_LIMIT").ok().and_then(|s| s.parse().ok()) {
            self.max_limit = v;
        }
    }

    /// # Errors
    ///
    /// Fails when `max_limit` is zero or below `default_limit`.
    pub fn check(&self) -> Result<()> {
        if self.max_limit == 0 {
            bail!("max_limit must be positive");
        }
        if self.default_limit > self.max_limit {
            bail!(
                "default_limit ({}) exceeds max_limit ({})",
                self.default_limit,
                self.max_limit
            );
        }
        Ok(())
    }
}
