//! Centralized error types for deployctl
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

use crate::domain::deploy::DeployPhase;
use crate::domain::version::VERSION_FORMAT;

/// Terminal errors of a deploy pipeline run.
///
/// Every variant aborts the run; none are retried internally.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Expected to find variable '{name}' in the given variable sources")]
    MissingVariable { name: String },

    #[error("Loading variables from '{source_name}': {reason}")]
    VarsFile {
        source_name: String,
        reason: anyhow::Error,
    },

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("Expected manifest to specify deployment name '{expected}' but was '{actual}'")]
    NameMismatch { expected: String, actual: String },

    #[error(transparent)]
    VersionFormat(#[from] VersionFormatError),

    #[error("Fetching diff result: {0}")]
    DiffFetch(anyhow::Error),

    #[error("Confirmation rejected: {0}")]
    ConfirmationRejected(anyhow::Error),

    #[error("Uploading release '{release}': {reason}")]
    Upload {
        release: String,
        reason: anyhow::Error,
    },

    #[error(transparent)]
    Update(anyhow::Error),

    #[error("Deployment cancelled while {}", .phase.activity())]
    Cancelled { phase: DeployPhase },
}

impl DeployError {
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }
}

/// Malformed release version string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Expected version '{version}' to match version format '{}'", VERSION_FORMAT)]
pub struct VersionFormatError {
    pub version: String,
}

/// Director API errors
#[derive(Error, Debug)]
pub enum DirectorError {
    #[error("Director request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Director responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Director task {id} finished in state '{state}': {result}")]
    TaskFailed {
        id: u64,
        state: String,
        result: String,
    },

    #[error("Failed to decode director response: {message}")]
    Decode { message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}
