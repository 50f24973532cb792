//! The resolved parameter set and the misses recorded while building it

use crate::payload::StackParameter;
use crate::resolver::Section;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Precedence tier a value came from. Later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Literal value from the manifest's `Parameters`
    Local,
    /// Value fetched from a dependent stack via `SourcedParameters`
    Sourced,
    /// Value supplied by the caller
    Override,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Local => "local",
            Tier::Sourced => "sourced",
            Tier::Override => "override",
        };
        write!(f, "{}", s)
    }
}

/// One final parameter value and the tier that set it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedParameter {
    pub value: String,
    pub tier: Tier,
}

/// A parameter source that could not contribute a value.
///
/// Misses never abort resolution; the named parameter is simply absent
/// (or keeps its lower-tier value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    /// `Parameters` entry with a null value
    NullValue { name: String },
    /// `Parameters` entry whose value has no string form
    UnsupportedValue { name: String },
    /// Reference to an alias not declared in `DependentStacks`
    UnknownAlias { name: String, alias: String },
    /// Reference to a section other than Parameters/Outputs/Resources
    UnknownSection { name: String, section: String },
    /// The dependent stack has no such key in the section
    MissingKey {
        name: String,
        alias: String,
        stack: String,
        section: Section,
        id: String,
    },
    /// The section lookup itself failed
    LookupFailed {
        name: String,
        alias: String,
        section: Section,
        message: String,
    },
}

impl Miss {
    /// Parameter name the miss belongs to
    pub fn name(&self) -> &str {
        match self {
            Miss::NullValue { name }
            | Miss::UnsupportedValue { name }
            | Miss::UnknownAlias { name, .. }
            | Miss::UnknownSection { name, .. }
            | Miss::MissingKey { name, .. }
            | Miss::LookupFailed { name, .. } => name,
        }
    }
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::NullValue { name } => {
                write!(f, "Parameter {} has a null value and was ignored", name)
            }
            Miss::UnsupportedValue { name } => {
                write!(f, "Parameter {} has a value with no string form and was ignored", name)
            }
            Miss::UnknownAlias { name, alias } => write!(
                f,
                "DependentStack {} was required by {} but was not declared",
                alias, name
            ),
            Miss::UnknownSection { name, section } => {
                write!(f, "Invalid SourcedParameters section '{}' for {}", section, name)
            }
            Miss::MissingKey {
                alias,
                stack,
                section,
                id,
                ..
            } => write!(
                f,
                "Unable to find {} in {} (aliased as {}) {}",
                id, stack, alias, section
            ),
            Miss::LookupFailed {
                name,
                alias,
                section,
                message,
            } => write!(
                f,
                "Lookup of {} {} for {} failed: {}",
                alias, section, name, message
            ),
        }
    }
}

/// De-duplicated parameter name -> final value mapping
///
/// Iteration is sorted by name. A value can only be replaced by one from the
/// same or a higher [`Tier`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParameters {
    entries: BTreeMap<String, ResolvedParameter>,
    misses: Vec<Miss>,
}

impl ResolvedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` from `tier`.
    ///
    /// Returns `false`, leaving the entry untouched, when the current value
    /// came from a higher tier.
    pub fn apply(&mut self, tier: Tier, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if let Some(existing) = self.entries.get(&name) {
            if existing.tier > tier {
                return false;
            }
            if existing.tier < tier {
                tracing::debug!(%name, from = %existing.tier, to = %tier, "Parameter overridden");
            }
        }
        self.entries.insert(
            name,
            ResolvedParameter {
                value: value.into(),
                tier,
            },
        );
        true
    }

    pub(crate) fn record_miss(&mut self, miss: Miss) {
        self.misses.push(miss);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|p| p.value.as_str())
    }

    pub fn tier(&self, name: &str) -> Option<Tier> {
        self.entries.get(name).map(|p| p.tier)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedParameter)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sources that could not contribute, in the order they were met
    pub fn misses(&self) -> &[Miss] {
        &self.misses
    }

    /// Plain name -> value view
    pub fn values(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    /// The ordered parameter list the provisioning service expects
    pub fn to_stack_parameters(&self) -> Vec<StackParameter> {
        self.entries
            .iter()
            .map(|(k, v)| StackParameter::new(k.clone(), v.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_tier_replaces_lower() {
        let mut set = ResolvedParameters::new();
        assert!(set.apply(Tier::Local, "A", "1"));
        assert!(set.apply(Tier::Sourced, "A", "2"));
        assert!(set.apply(Tier::Override, "A", "3"));

        assert_eq!(set.get("A"), Some("3"));
        assert_eq!(set.tier("A"), Some(Tier::Override));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn lower_tier_never_replaces_higher() {
        let mut set = ResolvedParameters::new();
        set.apply(Tier::Override, "A", "3");

        assert!(!set.apply(Tier::Sourced, "A", "2"));
        assert!(!set.apply(Tier::Local, "A", "1"));
        assert_eq!(set.get("A"), Some("3"));
    }

    #[test]
    fn stack_parameters_are_sorted_and_unique() {
        let mut set = ResolvedParameters::new();
        set.apply(Tier::Local, "Zone", "a");
        set.apply(Tier::Local, "Env", "dev");
        set.apply(Tier::Override, "Env", "prod");

        let params = set.to_stack_parameters();
        let keys: Vec<_> = params.iter().map(|p| p.parameter_key.as_str()).collect();
        assert_eq!(keys, vec!["Env", "Zone"]);
        assert_eq!(params[0].parameter_value, "prod");
        assert!(params.iter().all(|p| !p.use_previous_value));
    }

    #[test]
    fn miss_display_names_the_missing_id() {
        let miss = Miss::MissingKey {
            name: "VpcId".into(),
            alias: "net".into(),
            stack: "my-network-stack".into(),
            section: Section::Outputs,
            id: "Vpc".into(),
        };
        assert_eq!(miss.name(), "VpcId");
        assert_eq!(
            miss.to_string(),
            "Unable to find Vpc in my-network-stack (aliased as net) Outputs"
        );
    }
}
