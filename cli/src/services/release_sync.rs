//! Release synchronizer - uploads the manifest's remote releases
//!
//! Releases are handled strictly one at a time in manifest order. The
//! first failure stops the loop; earlier uploads stay in place.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cancellable;
use crate::domain::{
    DeployPhase, ParsedVersion, ReleaseSpec, ReleaseUploader, UploadOutcome, UploadRequest,
};
use crate::error::DeployError;

/// What happened to each release of the manifest
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub uploads: Vec<(String, UploadOutcome)>,
    /// Releases without a source URL
    pub skipped: Vec<String>,
}

pub struct ReleaseSynchronizer<'a> {
    uploader: &'a dyn ReleaseUploader,
}

impl<'a> ReleaseSynchronizer<'a> {
    pub fn new(uploader: &'a dyn ReleaseUploader) -> Self {
        Self { uploader }
    }

    /// Build the upload request for a release, or `None` if it has no source
    pub fn upload_request(release: &ReleaseSpec) -> Result<Option<UploadRequest>, DeployError> {
        let Some(url) = release.source_url() else {
            return Ok(None);
        };

        let version = ParsedVersion::parse(&release.version)?;
        Ok(Some(UploadRequest {
            name: release.name.clone(),
            url: url.to_string(),
            sha1: release.sha1.clone(),
            version,
        }))
    }

    pub async fn sync(
        &self,
        releases: &[ReleaseSpec],
        cancel: &CancellationToken,
    ) -> Result<SyncSummary, DeployError> {
        let mut summary = SyncSummary::default();

        for release in releases {
            let Some(request) = Self::upload_request(release)? else {
                debug!(release = %release.name, "No url, assuming release is present");
                summary.skipped.push(release.name.clone());
                continue;
            };

            info!(
                release = %request.name,
                version = %request.version,
                url = %request.url,
                "Uploading release"
            );

            let outcome = cancellable(cancel, DeployPhase::ReleasesSynced, async {
                self.uploader
                    .upload(&request)
                    .await
                    .map_err(|reason| DeployError::Upload {
                        release: request.name.clone(),
                        reason,
                    })
            })
            .await?;

            summary.uploads.push((request.name, outcome));
        }

        Ok(summary)
    }
}
