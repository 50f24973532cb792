//! Validate command: resolve and print the payload without submitting it

use super::{open_manifest, parameter_overrides, Backend};
use crate::cli::{ManifestArgs, ParameterArgs};
use crate::error::Result;

/// Run the validate command
pub fn run_validate(backend: &Backend, args: &ManifestArgs, parameters: &ParameterArgs) -> Result<()> {
    let mut manifest = open_manifest(backend, args)?;
    let payload = manifest.validate(&parameter_overrides(parameters))?;

    if let Some(resolved) = manifest.resolved() {
        for miss in resolved.misses() {
            tracing::warn!(parameter = %miss.name(), "{}", miss);
        }
    }

    println!("{}", payload.to_json_pretty()?);
    Ok(())
}
