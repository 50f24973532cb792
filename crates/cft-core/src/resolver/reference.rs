//! Parsing of `alias.section.id` source references

use crate::provider::{ProviderError, StackHandle, ValueMap};
use std::fmt;
use std::str::FromStr;

/// Which part of a dependent stack a reference reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Parameters,
    Outputs,
    Resources,
}

impl Section {
    /// Query the matching lookup on `stack`.
    pub fn lookup(self, stack: &dyn StackHandle) -> Result<ValueMap, ProviderError> {
        match self {
            Section::Parameters => stack.parameters(),
            Section::Outputs => stack.outputs(),
            Section::Resources => stack.resources(),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Parameters" => Ok(Section::Parameters),
            "Outputs" => Ok(Section::Outputs),
            "Resources" => Ok(Section::Resources),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Section::Parameters => "Parameters",
            Section::Outputs => "Outputs",
            Section::Resources => "Resources",
        };
        write!(f, "{}", s)
    }
}

/// A parsed `SourcedParameters` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    pub alias: String,
    pub section: Section,
    pub id: String,
}

/// Why a reference string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// Not exactly three non-empty dot-separated parts
    Malformed,
    /// Three parts, but the middle one names no known section
    UnknownSection { alias: String, section: String },
}

impl SourceReference {
    /// Parse `alias.section.id`.
    ///
    /// Section names are case-sensitive.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let parts: Vec<&str> = raw.split('.').collect();
        let [alias, section, id] = parts.as_slice() else {
            return Err(ReferenceError::Malformed);
        };

        if alias.is_empty() || section.is_empty() || id.is_empty() {
            return Err(ReferenceError::Malformed);
        }

        let section = section
            .parse::<Section>()
            .map_err(|section| ReferenceError::UnknownSection {
                alias: alias.to_string(),
                section,
            })?;

        Ok(Self {
            alias: alias.to_string(),
            section,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.alias, self.section, self.id)
    }
}
