//! # deployctl Configuration
//!
//! Loaded in three layers, later layers winning:
//!
//! 1. **Config file** (`--config`, `DEPLOYCTL_CONFIG`, or `~/.deployctl.yaml`)
//! 2. **Environment** (`DIRECTOR_URL`, `DIRECTOR_TOKEN`, `DIRECTOR_USERNAME`, `DIRECTOR_PASSWORD`)
//! 3. **CLI flags** (`--director`, `--non-interactive`)
//!
//! ## Example
//!
//! ```yaml
//! director:
//!   url: https://10.0.0.6:25555
//!   token: ...
//!   task_poll_interval: 1s
//! non_interactive: false
//! ```

mod director;

pub use director::DirectorConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

const DEFAULT_CONFIG_FILE: &str = ".deployctl.yaml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployctlConfig {
    #[serde(default)]
    pub director: DirectorConfig,

    /// Confirm prompts automatically
    #[serde(default)]
    pub non_interactive: bool,
}

impl DeployctlConfig {
    /// Load from `path`, or from `~/.deployctl.yaml` when no path is given.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Apply `DIRECTOR_*` overrides using `lookup` for variable access
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = get("DIRECTOR_URL") {
            self.director.url = Some(url);
        }
        if let Some(token) = get("DIRECTOR_TOKEN") {
            self.director.token = Some(token);
        }
        if let Some(username) = get("DIRECTOR_USERNAME") {
            self.director.username = Some(username);
        }
        if let Some(password) = get("DIRECTOR_PASSWORD") {
            self.director.password = Some(password);
        }
        self
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}
