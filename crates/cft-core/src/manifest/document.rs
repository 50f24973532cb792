//! The parsed manifest document and its override layer
//!
//! A [`Document`] is never mutated after parsing. Caller-supplied options go
//! into an [`OptionOverrides`] layer that is applied on top at read time.

use crate::resolver::{LEGACY_DEPENDENCY_FIELD, ParameterSources};
use crate::{Error, Result};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Immutable top-level fields of a manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    fields: Mapping,
    origin: String,
    base_dir: Option<PathBuf>,
}

impl Document {
    /// Wrap a parsed document.
    ///
    /// Fails with [`Error::Parse`] unless `value` is a mapping.
    pub fn from_value(value: Value, origin: impl Into<String>, base_dir: Option<PathBuf>) -> Result<Self> {
        let origin = origin.into();
        match value {
            Value::Mapping(fields) => Ok(Self {
                fields,
                origin,
                base_dir,
            }),
            // An empty file parses as null
            Value::Null => Ok(Self {
                fields: Mapping::new(),
                origin,
                base_dir,
            }),
            other => Err(Error::Parse {
                origin,
                message: format!("expected a mapping at the top level, found {}", kind_of(&other)),
            }),
        }
    }

    /// Where the document came from, for diagnostics
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Directory relative template paths are resolved against
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }
}

/// Top-level fields set by the caller; they win over the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionOverrides {
    fields: Mapping,
}

impl OptionOverrides {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(Value::String(key.into()), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether `key` appears in `document` as seen through this layer.
    ///
    /// A key with a null value still counts.
    pub fn declares(&self, document: &Document, key: &str) -> bool {
        self.get(key).is_some() || document.contains(key)
    }

    /// The document as seen through this layer
    pub fn apply(&self, document: &Document) -> Mapping {
        let mut merged = document.fields.clone();
        for (key, value) in &self.fields {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Typed view of the recognized manifest fields
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestSpec {
    pub stack_name: String,
    pub region: String,
    #[serde(default)]
    pub parameters: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub dependent_stacks: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub sourced_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub stack_policy: Option<Value>,
    #[serde(default, rename = "TimeOut")]
    pub time_out: Option<Value>,
    #[serde(default)]
    pub on_failure: Option<String>,
    #[serde(default)]
    pub termination_protection: Option<bool>,
    #[serde(default)]
    pub local_template: Option<PathBuf>,
    #[serde(default, rename = "S3Template")]
    pub s3_template: Option<String>,
}

impl ManifestSpec {
    /// Read the typed view of `document` with `overrides` applied.
    pub fn read(document: &Document, overrides: &OptionOverrides) -> Result<Self> {
        let merged = overrides.apply(document);

        // Checked before the typed view so the shape of other fields is irrelevant
        if merged.contains_key(LEGACY_DEPENDENCY_FIELD) {
            tracing::error!(manifest = %document.origin(), field = LEGACY_DEPENDENCY_FIELD, "Manifest uses a legacy dependency field");
            return Err(Error::UnsupportedLegacyField {
                field: LEGACY_DEPENDENCY_FIELD.to_string(),
            });
        }

        serde_yaml::from_value(Value::Mapping(merged)).map_err(|e| Error::InvalidManifest {
            origin: document.origin().to_string(),
            message: e.to_string(),
        })
    }

    /// The parameter-related fields, as the resolver consumes them
    pub fn parameter_sources(&self) -> ParameterSources {
        ParameterSources {
            parameters: self.parameters.clone().unwrap_or_default(),
            dependent_stacks: self.dependent_stacks.clone().unwrap_or_default(),
            sourced_parameters: self.sourced_parameters.clone().unwrap_or_default(),
            legacy_fields: Vec::new(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
