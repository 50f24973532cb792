//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cft-deploy - Deploy stacks from declarative manifests
#[derive(Parser, Debug)]
#[command(name = "cft-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(long, global = true, conflicts_with = "error")]
    pub debug: bool,

    /// Only log errors
    #[arg(long, global = true)]
    pub error: bool,

    /// Stack snapshot file backing the local provider
    #[arg(long, global = true, env = "CFT_DEPLOY_STACKS")]
    pub stacks: Option<PathBuf>,

    /// Credentials profile for the provider session
    #[arg(long, global = true, env = "CFT_DEPLOY_PROFILE")]
    pub profile: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve parameters and print the payload without submitting it
    Validate {
        #[command(flatten)]
        manifest: ManifestArgs,

        #[command(flatten)]
        parameters: ParameterArgs,
    },

    /// Print each resolved parameter and where its value came from
    Resolve {
        #[command(flatten)]
        manifest: ManifestArgs,

        #[command(flatten)]
        parameters: ParameterArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create the stack described by the manifest
    ///
    /// Examples:
    ///   cft-deploy create -m app.yaml --stacks stacks.yaml
    ///   cft-deploy create -m app.yaml -p Env=staging
    Create {
        #[command(flatten)]
        manifest: ManifestArgs,

        #[command(flatten)]
        parameters: ParameterArgs,
    },

    /// Print a URL to a monthly cost estimate for the manifest
    EstimateCost {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
}

/// The manifest and the top-level fields that may be overridden
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ManifestArgs {
    /// Manifest file (.yaml, .yml, .json or .toml)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Deploy to this region instead of the manifest's
    #[arg(long)]
    pub override_region: Option<String>,

    /// Use this local template instead of the manifest's
    #[arg(long, conflicts_with = "s3_template")]
    pub local_template: Option<PathBuf>,

    /// Use this template URL instead of the manifest's
    #[arg(long)]
    pub s3_template: Option<String>,

    /// Stack creation timeout, e.g. "30 minutes"
    #[arg(long)]
    pub timeout: Option<String>,
}

/// Parameter values that win over everything in the manifest
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ParameterArgs {
    /// Override a parameter (repeatable)
    #[arg(short = 'p', long = "override-parameter", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("parameter name cannot be empty in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
