//! Cross-stack parameter resolution
//!
//! The [`DependencyResolver`] turns a manifest's declared parameter sources
//! into a single [`ResolvedParameters`] set. Sources are applied as tiers,
//! lowest precedence first:
//!
//! 1. **Local** - literal `Parameters` entries
//! 2. **Sourced** - `SourcedParameters` references into dependent stacks
//! 3. **Override** - values supplied by the caller
//!
//! Structural problems (a legacy field, a dependent stack that does not
//! exist, a malformed reference) abort the whole resolution. A reference
//! that cannot be satisfied is logged, recorded as a [`Miss`] and skipped.

mod reference;
mod resolved;

pub use reference::{ReferenceError, Section, SourceReference};
pub use resolved::{Miss, ResolvedParameter, ResolvedParameters, Tier};

use crate::context::ExecutionContext;
use crate::provider::{ProviderError, StackHandle};
use crate::value::scalar_string;
use crate::{Error, Result};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Caller-supplied parameter values, the highest precedence tier
pub type ParameterOverrides = BTreeMap<String, String>;

/// Manifest field that is rejected outright when present
pub const LEGACY_DEPENDENCY_FIELD: &str = "DependsOnStacks";

/// The parameter-related parts of a manifest
#[derive(Debug, Clone, Default)]
pub struct ParameterSources {
    /// Literal `Parameters`; null values are kept so they can be reported
    pub parameters: BTreeMap<String, Value>,

    /// `DependentStacks`: alias -> stack name
    pub dependent_stacks: BTreeMap<String, String>,

    /// `SourcedParameters`: parameter name -> `alias.section.id`
    pub sourced_parameters: BTreeMap<String, String>,

    /// Legacy fields found in the manifest
    pub legacy_fields: Vec<String>,
}

/// Resolves parameter sources against dependent stacks in one region
pub struct DependencyResolver<'a> {
    ctx: &'a ExecutionContext,
    region: &'a str,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(ctx: &'a ExecutionContext, region: &'a str) -> Self {
        Self { ctx, region }
    }

    /// Compute the resolved parameter set.
    ///
    /// Queries every dependent stack from scratch; nothing is cached between
    /// calls.
    pub fn resolve(
        &self,
        sources: &ParameterSources,
        overrides: &ParameterOverrides,
    ) -> Result<ResolvedParameters> {
        let mut resolved = ResolvedParameters::new();

        self.apply_local(&mut resolved, &sources.parameters);

        if let Some(field) = sources.legacy_fields.first() {
            tracing::error!(%field, "Manifest uses a legacy dependency field");
            return Err(Error::UnsupportedLegacyField {
                field: field.clone(),
            });
        }

        let stacks = self.open_dependent_stacks(&sources.dependent_stacks)?;
        self.apply_sourced(&mut resolved, &stacks, &sources.sourced_parameters)?;

        for (name, value) in overrides {
            resolved.apply(Tier::Override, name.clone(), value.clone());
        }

        tracing::debug!(
            count = resolved.len(),
            misses = resolved.misses().len(),
            "Resolved parameters"
        );
        Ok(resolved)
    }

    fn apply_local(&self, resolved: &mut ResolvedParameters, parameters: &BTreeMap<String, Value>) {
        for (name, value) in parameters {
            if value.is_null() {
                tracing::warn!(
                    %name,
                    "Parameter has a null value in the manifest file and will be ignored"
                );
                resolved.record_miss(Miss::NullValue { name: name.clone() });
                continue;
            }

            match scalar_string(value) {
                Some(value) => {
                    resolved.apply(Tier::Local, name.clone(), value);
                }
                None => {
                    tracing::warn!(%name, "Parameter value has no string form and will be ignored");
                    resolved.record_miss(Miss::UnsupportedValue { name: name.clone() });
                }
            }
        }
    }

    /// Obtain a handle on every declared dependent stack, in alias order.
    fn open_dependent_stacks(
        &self,
        dependent_stacks: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, Box<dyn StackHandle>>> {
        let mut stacks = BTreeMap::new();

        for (alias, stack_name) in dependent_stacks {
            tracing::debug!(%alias, stack = %stack_name, region = %self.region, "Opening dependent stack");
            let handle = self
                .ctx
                .stacks()
                .stack(stack_name, self.region, self.ctx.session())
                .map_err(|e| match e {
                    ProviderError::StackNotFound { .. } => {
                        tracing::error!(%alias, stack = %stack_name, "Dependent stack not found");
                        Error::DependentStackNotFound {
                            alias: alias.clone(),
                            stack: stack_name.clone(),
                            region: self.region.to_string(),
                        }
                    }
                    other => {
                        tracing::error!(%alias, stack = %stack_name, error = %other, "Dependent stack lookup failed");
                        Error::Provider(other)
                    }
                })?;
            stacks.insert(alias.clone(), handle);
        }

        Ok(stacks)
    }

    fn apply_sourced(
        &self,
        resolved: &mut ResolvedParameters,
        stacks: &BTreeMap<String, Box<dyn StackHandle>>,
        sourced: &BTreeMap<String, String>,
    ) -> Result<()> {
        for (name, raw) in sourced {
            let reference = match SourceReference::parse(raw) {
                Ok(reference) => reference,
                Err(ReferenceError::Malformed) => {
                    tracing::error!(%name, reference = %raw, "Malformed sourced parameter reference");
                    return Err(Error::MalformedReference {
                        parameter: name.clone(),
                        reference: raw.clone(),
                    });
                }
                Err(ReferenceError::UnknownSection { section, .. }) => {
                    tracing::error!(%name, %section, "Invalid SourcedParameters section type");
                    resolved.record_miss(Miss::UnknownSection {
                        name: name.clone(),
                        section,
                    });
                    continue;
                }
            };

            if let Some(value) = self.lookup(resolved, stacks, name, &reference) {
                resolved.apply(Tier::Sourced, name.clone(), value);
            }
        }

        Ok(())
    }

    /// Fetch one referenced value, recording a miss when it cannot be found.
    fn lookup(
        &self,
        resolved: &mut ResolvedParameters,
        stacks: &BTreeMap<String, Box<dyn StackHandle>>,
        name: &str,
        reference: &SourceReference,
    ) -> Option<String> {
        let Some(stack) = stacks.get(&reference.alias) else {
            let miss = Miss::UnknownAlias {
                name: name.to_string(),
                alias: reference.alias.clone(),
            };
            tracing::error!("{}", miss);
            resolved.record_miss(miss);
            return None;
        };

        let values = match reference.section.lookup(stack.as_ref()) {
            Ok(values) => values,
            Err(e) => {
                let miss = Miss::LookupFailed {
                    name: name.to_string(),
                    alias: reference.alias.clone(),
                    section: reference.section,
                    message: e.to_string(),
                };
                tracing::error!("{}", miss);
                resolved.record_miss(miss);
                return None;
            }
        };

        match values.get(&reference.id) {
            Some(value) => Some(value.clone()),
            None => {
                let miss = Miss::MissingKey {
                    name: name.to_string(),
                    alias: reference.alias.clone(),
                    stack: stack.name().to_string(),
                    section: reference.section,
                    id: reference.id.clone(),
                };
                tracing::error!("{}", miss);
                resolved.record_miss(miss);
                None
            }
        }
    }
}
