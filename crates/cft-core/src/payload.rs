//! The provisioning request body
//!
//! Field names serialize exactly as the provisioning service expects them.

use crate::value::scalar_string;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// The only capability requested on every stack
pub const NAMED_IAM_CAPABILITY: &str = "CAPABILITY_NAMED_IAM";

/// One entry of the payload's parameter list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackParameter {
    pub parameter_key: String,
    pub parameter_value: String,
    pub use_previous_value: bool,
}

impl StackParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            parameter_key: key.into(),
            parameter_value: value.into(),
            use_previous_value: false,
        }
    }
}

/// A stack tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Where the provisioning service reads the template from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSource {
    /// Template text read from `LocalTemplate`
    TemplateBody(String),
    /// URL taken from `S3Template`
    #[serde(rename = "TemplateURL")]
    TemplateUrl(String),
}

/// The complete create/validate payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackPayload {
    pub stack_name: String,
    pub parameters: Vec<StackParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_in_minutes: Option<u32>,
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_policy_body: Option<String>,
    pub tags: Vec<Tag>,
    pub enable_termination_protection: bool,
    #[serde(flatten)]
    pub template: TemplateSource,
}

impl StackPayload {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a `TimeOut` value into minutes.
///
/// Every non-digit character is stripped first, so `"60 minutes"` is `60`.
pub fn parse_timeout(raw: &Value) -> Result<u32> {
    let text = scalar_string(raw).unwrap_or_default();
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();

    digits
        .parse::<u32>()
        .map_err(|_| Error::InvalidTimeout { value: text })
}

/// JSON stack policy document wrapping the manifest's `StackPolicy` statements
pub fn stack_policy_body(statement: &Value) -> Result<String> {
    let mut body = serde_json::Map::new();
    body.insert("Statement".to_string(), serde_json::to_value(statement)?);
    Ok(serde_json::to_string(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("\"60 minutes\"", 60)]
    #[case("\"90\"", 90)]
    #[case("45", 45)]
    #[case("\"1h 30m\"", 130)]
    fn parses_timeout_by_stripping_non_digits(#[case] yaml: &str, #[case] expected: u32) {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parse_timeout(&value).unwrap(), expected);
    }

    #[rstest]
    #[case("\"forever\"")]
    #[case("~")]
    #[case("\"99999999999 minutes\"")]
    fn rejects_timeout_without_usable_digits(#[case] yaml: &str) {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(parse_timeout(&value), Err(Error::InvalidTimeout { .. })));
    }

    #[test]
    fn stack_policy_wraps_statement() {
        let statement: Value = serde_yaml::from_str(
            "- Effect: Allow\n  Action: 'Update:*'\n  Principal: '*'\n  Resource: '*'\n",
        )
        .unwrap();

        let body = stack_policy_body(&statement).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["Statement"][0]["Effect"], "Allow");
        assert_eq!(parsed["Statement"][0]["Action"], "Update:*");
    }

    #[test]
    fn payload_serializes_with_service_field_names() {
        let payload = StackPayload {
            stack_name: "my-app".into(),
            parameters: vec![StackParameter::new("Env", "prod")],
            timeout_in_minutes: Some(60),
            capabilities: vec![NAMED_IAM_CAPABILITY.to_string()],
            on_failure: Some("DELETE".into()),
            stack_policy_body: None,
            tags: vec![Tag {
                key: "team".into(),
                value: "platform".into(),
            }],
            enable_termination_protection: true,
            template: TemplateSource::TemplateUrl("https://bucket/template.yaml".into()),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "StackName": "my-app",
                "Parameters": [
                    {"ParameterKey": "Env", "ParameterValue": "prod", "UsePreviousValue": false}
                ],
                "TimeoutInMinutes": 60,
                "Capabilities": ["CAPABILITY_NAMED_IAM"],
                "OnFailure": "DELETE",
                "Tags": [{"Key": "team", "Value": "platform"}],
                "EnableTerminationProtection": true,
                "TemplateURL": "https://bucket/template.yaml"
            })
        );
    }
}
