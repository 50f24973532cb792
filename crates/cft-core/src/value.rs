//! Conversion of manifest values into the strings the provisioning service takes

use serde_yaml::Value;

/// String form of a manifest value.
///
/// Scalars use their plain text form. A sequence of scalars becomes a
/// comma-delimited list. Null, mappings and nested sequences have no string
/// form and yield `None`.
///
/// Numbers are re-rendered from their parsed value, so `0.10` becomes
/// `"0.1"`. Quote a value in the manifest to keep its exact text.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::Sequence(_) => None,
                other => scalar_string(other),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Mapping(_) => None,
    }
}
