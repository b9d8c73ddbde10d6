//! Diff presenter - fetches and shows the deployment diff

use tracing::debug;

use crate::domain::diff::render_diff;
use crate::domain::{RecordStore, Ui};
use crate::error::DeployError;

/// Fetch the diff for `manifest` and say each rendered line.
///
/// Nothing is shown unless the whole diff was fetched. Returns the
/// number of lines shown.
pub async fn present_diff(
    store: &dyn RecordStore,
    ui: &dyn Ui,
    manifest: &[u8],
) -> Result<usize, DeployError> {
    let lines = store.diff(manifest).await.map_err(DeployError::DiffFetch)?;
    debug!(deployment = %store.name(), lines = lines.len(), "Fetched diff");

    let rendered = render_diff(&lines);
    for line in &rendered {
        ui.say(line);
    }
    Ok(rendered.len())
}
