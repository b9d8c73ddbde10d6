use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::VarArgs;
use crate::config::DeployctlConfig;
use crate::domain::{DeployOptions, DeployReport, UploadOutcome};
use crate::infrastructure::{DirectorClient, DirectorDeployment, DirectorReleaseUploader};
use crate::services::{DeployRequest, DeployService};
use crate::ui::{self, TerminalUi};

pub async fn execute(
    config: DeployctlConfig,
    manifest_path: PathBuf,
    deployment: String,
    vars: VarArgs,
    options: DeployOptions,
) -> Result<()> {
    ui::print_header(&format!("Deploy: {}", deployment));

    let manifest = tokio::fs::read(&manifest_path)
        .await
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;

    let client = Arc::new(DirectorClient::from_config(&config.director)?);
    info!("🎯 Director: {}", client.base_url());
    info!("🚀 Deployment: {}", deployment);
    if options.recreate {
        info!("♻️  Recreating all VMs");
    }

    let service = DeployService::new(
        Arc::new(DirectorDeployment::new(client.clone(), &deployment)),
        Arc::new(DirectorReleaseUploader::new(client)),
        Arc::new(TerminalUi::new(config.non_interactive)),
    );

    let variables = super::variable_set(&vars);
    if variables.is_empty() {
        debug!("No variables given, placeholders will fail to resolve");
    }

    let request = DeployRequest {
        manifest,
        variables,
        options,
    };

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping deploy");
            cancel_on_signal.cancel();
        }
    });

    match service.execute(request, &cancel).await {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            ui::print_error(&format!("Deploy of '{}' failed", deployment));
            Err(e.into())
        }
    }
}

fn print_summary(report: &DeployReport) {
    println!();
    println!(
        "{}",
        "════════════════════════════════════════════════════════════".bright_blue()
    );
    ui::print_success(&format!("Deployment '{}' updated", report.deployment));

    println!();
    for step in &report.steps {
        println!(
            "   {} {} ({:.1}s)",
            "✅",
            step.phase.name(),
            step.duration.as_secs_f64()
        );
    }

    if !report.uploads.is_empty() || !report.skipped.is_empty() {
        println!();
        for (name, outcome) in &report.uploads {
            let status = match outcome {
                UploadOutcome::Uploaded => "uploaded".green(),
                UploadOutcome::AlreadyPresent => "already present".dimmed(),
            };
            println!("   📦 {} {}", name.cyan(), status);
        }
        for name in &report.skipped {
            ui::print_info(&format!("Release '{}' has no url, not uploaded", name));
        }
    }
    println!();
}
