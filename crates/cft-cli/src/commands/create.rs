//! Create command: submit the manifest's stack to the provisioning service

use colored::Colorize;

use super::{open_manifest, parameter_overrides, Backend};
use crate::cli::{ManifestArgs, ParameterArgs};
use crate::error::{CliError, Result};

/// Run the create command
///
/// The stack snapshot is saved after a successful create so later
/// manifests can source values from the new stack.
pub fn run_create(backend: &Backend, args: &ManifestArgs, parameters: &ParameterArgs) -> Result<()> {
    let mut manifest = open_manifest(backend, args)?;
    let stack_name = manifest.stack_name()?;

    let Some(stack) = manifest.create_stack(&parameter_overrides(parameters))? else {
        return Err(CliError::user(format!(
            "Stack {} was not created, see the log above",
            stack_name
        )));
    };
    backend.local().save()?;

    println!(
        "{} Created stack {} in {}",
        "OK".green().bold(),
        stack.name().cyan(),
        stack.region()
    );
    for (key, value) in stack.parameters().map_err(cft_core::Error::from)? {
        println!("  {:<24} {}", key, value);
    }
    Ok(())
}
