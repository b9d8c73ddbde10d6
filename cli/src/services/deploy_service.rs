//! Deploy service - orchestrates the deploy pipeline
//!
//! Interpolate, validate, diff, confirm, sync releases, update. Each
//! step runs only after the previous one succeeded; the first failure
//! aborts the run and nothing already done is undone.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cancellable;
use super::diff_presenter::present_diff;
use super::release_sync::ReleaseSynchronizer;
use crate::domain::deploy::StepResult;
use crate::domain::variables::interpolate;
use crate::domain::{
    DeployOptions, DeployPhase, DeployReport, ManifestDocument, RecordStore, ReleaseUploader,
    Ui, UpdateRequest, VariableSet,
};
use crate::error::DeployError;

/// Inputs assembled by the CLI layer
pub struct DeployRequest {
    pub manifest: Vec<u8>,
    pub variables: VariableSet,
    pub options: DeployOptions,
}

/// Service for running one deploy pipeline
pub struct DeployService {
    store: Arc<dyn RecordStore>,
    uploader: Arc<dyn ReleaseUploader>,
    ui: Arc<dyn Ui>,
}

/// Tracks the current phase and step timings of one run
struct Progress {
    phase: DeployPhase,
    started: Instant,
    report: DeployReport,
}

impl Progress {
    fn new(deployment: &str) -> Self {
        Self {
            phase: DeployPhase::Start,
            started: Instant::now(),
            report: DeployReport::new(deployment),
        }
    }

    /// Next phase the run is working towards
    fn target(&self) -> DeployPhase {
        self.phase.next().unwrap_or(DeployPhase::Aborted)
    }

    fn advance(&mut self) {
        let next = self.target();
        let duration = self.started.elapsed();
        debug!(phase = %next, elapsed_ms = duration.as_millis() as u64, "Phase reached");
        self.report.steps.push(StepResult {
            phase: next,
            duration,
        });
        self.phase = next;
        self.report.phase = next;
        self.started = Instant::now();
    }

    fn abort(&mut self, err: &DeployError) {
        if self.phase.is_terminal() {
            return;
        }
        warn!(phase = %self.target(), error = %err, "Deploy aborted");
        self.phase = DeployPhase::Aborted;
        self.report.phase = DeployPhase::Aborted;
    }
}

impl DeployService {
    /// Create a new deploy service
    pub fn new(
        store: Arc<dyn RecordStore>,
        uploader: Arc<dyn ReleaseUploader>,
        ui: Arc<dyn Ui>,
    ) -> Self {
        Self {
            store,
            uploader,
            ui,
        }
    }

    /// Run the full pipeline once
    pub async fn execute(
        &self,
        request: DeployRequest,
        cancel: &CancellationToken,
    ) -> Result<DeployReport, DeployError> {
        let mut progress = Progress::new(self.store.name());

        match self.run(request, cancel, &mut progress).await {
            Ok(()) => {
                progress.advance();
                info!(
                    deployment = %self.store.name(),
                    phase = %progress.report.phase,
                    uploaded = progress.report.uploaded_count(),
                    "Deploy finished"
                );
                Ok(progress.report)
            }
            Err(err) => {
                progress.abort(&err);
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        request: DeployRequest,
        cancel: &CancellationToken,
        progress: &mut Progress,
    ) -> Result<(), DeployError> {
        let DeployRequest {
            manifest,
            variables,
            options,
        } = request;

        // Start → Interpolated
        let interpolated = cancellable(cancel, progress.target(), async {
            let vars = variables.resolve().await?;
            interpolate(&manifest, &vars)
        })
        .await?;
        progress.advance();

        // Interpolated → Validated
        let document = ManifestDocument::parse(interpolated)?;
        let releases = document.validate_for(self.store.name())?;
        info!(
            deployment = %document.name(),
            releases = releases.len(),
            "Manifest validated"
        );
        progress.advance();

        // Validated → Diffed
        self.ui
            .say(&format!("Using deployment '{}'\n", self.store.name()));
        cancellable(
            cancel,
            progress.target(),
            present_diff(self.store.as_ref(), self.ui.as_ref(), document.bytes()),
        )
        .await?;
        progress.advance();

        // Diffed → Confirmed
        cancellable(cancel, progress.target(), self.confirm()).await?;
        progress.advance();

        // Confirmed → ReleasesSynced
        let summary = ReleaseSynchronizer::new(self.uploader.as_ref())
            .sync(releases, cancel)
            .await?;
        progress.report.uploads = summary.uploads;
        progress.report.skipped = summary.skipped;
        progress.advance();

        // ReleasesSynced → Updated
        let update = UpdateRequest {
            manifest: document.bytes().to_vec(),
            recreate: options.recreate,
            skip_drain: options.skip_drain,
        };
        cancellable(cancel, progress.target(), self.commit(&update)).await?;
        progress.advance();

        Ok(())
    }

    /// The single confirmation checkpoint of a run
    async fn confirm(&self) -> Result<(), DeployError> {
        self.ui
            .ask_for_confirmation()
            .await
            .map_err(DeployError::ConfirmationRejected)
    }

    /// Hand the final manifest to the record store; errors pass through as-is
    async fn commit(&self, update: &UpdateRequest) -> Result<(), DeployError> {
        info!(
            deployment = %self.store.name(),
            recreate = update.recreate,
            skip_drain = ?update.skip_drain,
            "Updating deployment"
        );
        self.store
            .update(&update.manifest, update.recreate, &update.skip_drain)
            .await
            .map_err(DeployError::Update)
    }
}
