//! CLI definitions for deployctl
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::{SkipDrain, VarKv};

#[derive(Parser)]
#[command(
    name = "deployctl",
    version,
    about = "Deployment update orchestrator",
    long_about = "Interpolates a deployment manifest, shows the diff against the live deployment,\nuploads missing releases and applies the update."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.deployctl.yaml)
    #[arg(long, global = true, env = "DEPLOYCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Director URL (overrides config and DIRECTOR_URL)
    #[arg(long, global = true)]
    pub director: Option<String>,
}

/// Variable sources shared by every manifest command
#[derive(Args, Debug, Clone, Default)]
pub struct VarArgs {
    /// Set variable (name=value); takes precedence over vars files
    #[arg(short = 'v', long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<VarKv>,

    /// Load variables from a YAML file; earlier files take precedence
    #[arg(short = 'l', long = "vars-file", value_name = "PATH")]
    pub vars_files: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Update a deployment from a manifest
    Deploy {
        /// Path to the deployment manifest
        manifest: PathBuf,

        /// Name of the targeted deployment
        #[arg(short = 'd', long, env = "DEPLOYCTL_DEPLOYMENT")]
        deployment: String,

        #[command(flatten)]
        vars: VarArgs,

        /// Recreate all VMs in the deployment
        #[arg(long)]
        recreate: bool,

        /// Skip drain scripts for all instance groups, or only the listed ones
        #[arg(
            long,
            value_name = "GROUP,...",
            num_args = 0..=1,
            require_equals = true
        )]
        skip_drain: Option<Option<String>>,

        /// Do not prompt for confirmation
        #[arg(short = 'n', long)]
        non_interactive: bool,
    },

    /// Print the manifest with variables interpolated
    Interpolate {
        /// Path to the manifest
        manifest: PathBuf,

        #[command(flatten)]
        vars: VarArgs,
    },
}

/// Map the `--skip-drain` flag onto the domain directive
pub fn skip_drain_directive(flag: &Option<Option<String>>) -> SkipDrain {
    SkipDrain::from_flag(flag.as_ref().map(|groups| groups.as_deref()))
}
