//! Collaborator ports
//!
//! The pipeline talks to the outside world only through these traits.
//! Implementations are injected at construction:
//! - `DirectorDeployment` / `DirectorReleaseUploader`: HTTP director API
//! - `VarsFile`: YAML vars file on disk
//! - `TerminalUi`: stdout plus a stdin prompt

use async_trait::async_trait;
use serde_yaml::Mapping;

use super::deploy::{SkipDrain, UploadOutcome, UploadRequest};
use super::diff::DiffLine;

/// Remote store that owns the live deployment record
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name of the targeted deployment
    fn name(&self) -> &str;

    /// Compute the ordered diff between the live deployment and `manifest`
    async fn diff(&self, manifest: &[u8]) -> anyhow::Result<Vec<DiffLine>>;

    /// Apply `manifest` to the deployment
    async fn update(
        &self,
        manifest: &[u8],
        recreate: bool,
        skip_drain: &SkipDrain,
    ) -> anyhow::Result<()>;
}

/// Transport that makes a release available to the director
#[async_trait]
pub trait ReleaseUploader: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> anyhow::Result<UploadOutcome>;
}

/// User-facing output and the confirmation prompt
#[async_trait]
pub trait Ui: Send + Sync {
    fn say(&self, line: &str);

    /// `Err` means the user rejected or the prompt failed
    async fn ask_for_confirmation(&self) -> anyhow::Result<()>;
}

/// File-backed variables
#[async_trait]
pub trait VariableSource: Send + Sync {
    /// Shown in error messages
    fn name(&self) -> &str;

    async fn load(&self) -> anyhow::Result<Mapping>;
}
