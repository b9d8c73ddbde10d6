//! Director connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How to reach the director API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Base URL (e.g., "https://10.0.0.6:25555")
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer token (takes precedence over basic auth)
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout (e.g., "60s", "2m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,

    /// Delay between task status polls
    #[serde(default = "default_task_poll_interval")]
    pub task_poll_interval: String,
}

fn default_request_timeout() -> String {
    "60s".to_string()
}

fn default_connect_timeout() -> String {
    "10s".to_string()
}

fn default_task_poll_interval() -> String {
    "2s".to_string()
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            username: None,
            password: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            task_poll_interval: default_task_poll_interval(),
        }
    }
}

impl DirectorConfig {
    /// Director URL without a trailing slash
    pub fn base_url(&self) -> Result<String, ConfigError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| ConfigError::MissingField {
                field: "director.url (or DIRECTOR_URL)".to_string(),
            })
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("director.request_timeout", &self.request_timeout)
    }

    pub fn connect_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("director.connect_timeout", &self.connect_timeout)
    }

    pub fn task_poll_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration("director.task_poll_interval", &self.task_poll_interval)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}
