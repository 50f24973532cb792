//! Command implementations for cft-cli

pub mod create;
pub mod estimate;
pub mod resolve;
pub mod validate;

pub use create::run_create;
pub use estimate::run_estimate_cost;
pub use resolve::run_resolve;
pub use validate::run_validate;

use std::path::Path;
use std::sync::Arc;

use cft_core::{ExecutionContext, LocalBackend, Manifest, ParameterOverrides, Session};

use crate::cli::{ManifestArgs, ParameterArgs};
use crate::error::Result;

/// Collaborators every command runs against
pub struct Backend {
    session: Session,
    local: Arc<LocalBackend>,
}

impl Backend {
    /// Open the stack snapshot at `stacks`, or an empty in-memory table.
    pub fn open(stacks: Option<&Path>, profile: Option<&str>) -> Result<Self> {
        let local = match stacks {
            Some(path) => LocalBackend::open(path)?,
            None => LocalBackend::new(),
        };
        let session = match profile {
            Some(profile) => Session::with_profile(profile),
            None => Session::new(),
        };
        Ok(Self {
            session,
            local: Arc::new(local),
        })
    }

    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::local(self.session.clone(), self.local.clone())
    }

    pub fn local(&self) -> &LocalBackend {
        &self.local
    }
}

/// Load the manifest and layer the command-line field overrides on top.
pub fn open_manifest(backend: &Backend, args: &ManifestArgs) -> Result<Manifest> {
    let ctx = backend.context();
    let span = tracing::info_span!(parent: ctx.span(), "manifest", path = %args.manifest.display());
    let mut manifest = Manifest::load(&args.manifest, ctx.with_span(span))?;

    if let Some(region) = &args.override_region {
        manifest.override_option("Region", region.as_str());
    }
    if let Some(path) = &args.local_template {
        // Relative to where the command was run, not to the manifest
        let path = std::env::current_dir()?.join(path);
        manifest.override_option("LocalTemplate", path.display().to_string());
    }
    if let Some(url) = &args.s3_template {
        manifest.override_option("S3Template", url.as_str());
    }
    if let Some(timeout) = &args.timeout {
        manifest.override_option("TimeOut", timeout.as_str());
    }

    Ok(manifest)
}

/// Collect `KEY=VALUE` pairs. A repeated key keeps its last value.
pub fn parameter_overrides(args: &ParameterArgs) -> ParameterOverrides {
    args.overrides.iter().cloned().collect()
}
