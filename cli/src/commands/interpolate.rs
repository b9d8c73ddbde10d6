use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::VarArgs;
use crate::domain::variables::interpolate;

/// Print the manifest with every placeholder resolved
pub async fn execute(manifest_path: PathBuf, vars: VarArgs) -> Result<()> {
    let manifest = tokio::fs::read(&manifest_path)
        .await
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;

    let resolved = super::variable_set(&vars).resolve().await?;
    let output = interpolate(&manifest, &resolved)?;
    debug!(bytes = output.len(), "Interpolated manifest");

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output)
        .context("Failed to write manifest to stdout")?;
    stdout.flush()?;
    Ok(())
}
