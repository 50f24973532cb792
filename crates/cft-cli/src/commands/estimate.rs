//! Estimate-cost command

use super::{open_manifest, Backend};
use crate::cli::ManifestArgs;
use crate::error::Result;

/// Run the estimate-cost command
pub fn run_estimate_cost(backend: &Backend, args: &ManifestArgs) -> Result<()> {
    let mut manifest = open_manifest(backend, args)?;
    let url = manifest.estimate_cost()?;
    println!("{}", url);
    Ok(())
}
