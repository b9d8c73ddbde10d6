//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services reach infrastructure only through the ports in `domain::ports`.

pub mod deploy_service;
pub mod diff_presenter;
pub mod release_sync;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use deploy_service::{DeployRequest, DeployService};

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::domain::DeployPhase;
use crate::error::DeployError;

/// Race a pipeline step against the caller's cancellation
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    phase: DeployPhase,
    step: F,
) -> Result<T, DeployError>
where
    F: Future<Output = Result<T, DeployError>>,
{
    if cancel.is_cancelled() {
        return Err(DeployError::Cancelled { phase });
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DeployError::Cancelled { phase }),
        result = step => result,
    }
}
