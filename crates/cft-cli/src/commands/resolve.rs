//! Resolve command: show every parameter and the tier that set it

use colored::Colorize;
use serde_json::{Map, Value, json};

use super::{open_manifest, parameter_overrides, Backend};
use crate::cli::{ManifestArgs, ParameterArgs};
use crate::error::Result;
use cft_core::{ResolvedParameters, Tier};

/// Run the resolve command
pub fn run_resolve(
    backend: &Backend,
    args: &ManifestArgs,
    parameters: &ParameterArgs,
    as_json: bool,
) -> Result<()> {
    let mut manifest = open_manifest(backend, args)?;
    let stack_name = manifest.stack_name()?;
    let resolved = manifest.resolve_parameters(&parameter_overrides(parameters))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&to_json(resolved))?);
    } else {
        print_table(&stack_name, resolved);
    }
    Ok(())
}

fn to_json(resolved: &ResolvedParameters) -> Value {
    let mut parameters = Map::new();
    for (name, parameter) in resolved.iter() {
        parameters.insert(
            name.to_string(),
            json!({ "value": parameter.value, "tier": parameter.tier }),
        );
    }
    let misses: Vec<Value> = resolved
        .misses()
        .iter()
        .map(|miss| json!({ "parameter": miss.name(), "reason": miss.to_string() }))
        .collect();

    json!({ "parameters": parameters, "misses": misses })
}

fn print_table(stack_name: &str, resolved: &ResolvedParameters) {
    println!("{} {}", "Parameters for".bold(), stack_name.cyan().bold());
    println!();

    if resolved.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (name, parameter) in resolved.iter() {
        let tier = match parameter.tier {
            Tier::Local => parameter.tier.to_string().normal(),
            Tier::Sourced => parameter.tier.to_string().blue(),
            Tier::Override => parameter.tier.to_string().yellow(),
        };
        println!("  {:<24} {} ({})", name.green(), parameter.value, tier);
    }

    if !resolved.misses().is_empty() {
        println!();
        println!("{}", "Unresolved".yellow().bold());
        for miss in resolved.misses() {
            println!("  {:<24} {}", miss.name().red(), miss);
        }
    }
}
