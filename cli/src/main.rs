use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;
mod ui;

use cli::{skip_drain_directive, Cli, Commands};
use commands::{deploy, interpolate};
use config::DeployctlConfig;
use domain::DeployOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Deploy {
            manifest,
            deployment,
            vars,
            recreate,
            skip_drain,
            non_interactive,
        } => {
            let mut config = DeployctlConfig::load(cli.config.as_deref())?;
            if let Some(url) = cli.director {
                config.director.url = Some(url);
            }
            config.non_interactive |= non_interactive;

            let options = DeployOptions::new()
                .with_recreate(recreate)
                .with_skip_drain(skip_drain_directive(&skip_drain));

            deploy::execute(config, manifest, deployment, vars, options).await?;
        }
        Commands::Interpolate { manifest, vars } => {
            interpolate::execute(manifest, vars).await?;
        }
    }

    Ok(())
}
