//! Multi-stack workflows across the manifest, resolver and local backend
//!
//! Each test deploys stacks through [`Manifest::create_stack`] against a
//! snapshot-backed [`LocalBackend`], then checks what later manifests see.

use cft_core::{
    Error, ExecutionContext, LocalBackend, Manifest, ParameterOverrides, Session, TemplateSource,
    Tier,
};
use cft_test_utils::{ManifestBuilder, TestWorkspace};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

const REGION: &str = "us-east-1";

fn open_backend(ws: &TestWorkspace) -> Arc<LocalBackend> {
    Arc::new(LocalBackend::open(ws.path("stacks.yaml")).unwrap())
}

fn context(backend: &Arc<LocalBackend>) -> ExecutionContext {
    ExecutionContext::local(Session::with_profile("integration"), backend.clone())
}

fn deploy(manifest: &Path, backend: &Arc<LocalBackend>, overrides: &ParameterOverrides) {
    let mut manifest = Manifest::load(manifest, context(backend)).unwrap();
    let stack = manifest.create_stack(overrides).unwrap();
    assert!(stack.is_some(), "stack should have been created");
    backend.save().unwrap();
}

/// Network stack with a literal CIDR, deployed into a fresh snapshot
fn deploy_network(ws: &TestWorkspace) {
    ws.write_template("templates/network.yaml");
    let manifest = ws.write(
        "network.yaml",
        &ManifestBuilder::new("network", REGION)
            .local_template("templates/network.yaml")
            .parameter("CidrBlock", "10.0.0.0/16")
            .tag("layer", "network")
            .build(),
    );
    deploy(&manifest, &open_backend(ws), &ParameterOverrides::new());
}

#[test]
fn test_sourced_values_survive_snapshot_reload() {
    let ws = TestWorkspace::new();
    deploy_network(&ws);

    ws.assert_file_contains("stacks.yaml", "network");
    ws.assert_file_contains("stacks.yaml", "10.0.0.0/16");

    let app = ws.write(
        "app.yaml",
        &ManifestBuilder::new("app", REGION)
            .s3_template("https://bucket.example/app.yaml")
            .parameter("Env", "dev")
            .dependent_stack("net", "network")
            .sourced("Cidr", "net.Parameters.CidrBlock")
            .build(),
    );

    let backend = open_backend(&ws);
    let mut manifest = Manifest::load(&app, context(&backend)).unwrap();
    let payload = manifest.validate(&ParameterOverrides::new()).unwrap();

    let parameters: Vec<(String, String)> = payload
        .parameters
        .iter()
        .map(|p| (p.parameter_key.clone(), p.parameter_value.clone()))
        .collect();
    assert_eq!(
        parameters,
        vec![
            ("Cidr".to_string(), "10.0.0.0/16".to_string()),
            ("Env".to_string(), "dev".to_string()),
        ]
    );
    assert_eq!(
        payload.template,
        TemplateSource::TemplateUrl("https://bucket.example/app.yaml".to_string())
    );
}

#[test]
fn test_values_flow_through_a_chain_of_stacks() {
    let ws = TestWorkspace::new();
    deploy_network(&ws);
    ws.write_template("templates/service.yaml");

    let database = ws.write(
        "database.yaml",
        &ManifestBuilder::new("database", REGION)
            .local_template("templates/service.yaml")
            .dependent_stack("net", "network")
            .sourced("NetworkCidr", "net.Parameters.CidrBlock")
            .build(),
    );
    let overrides = BTreeMap::from([("DbName".to_string(), "orders".to_string())]);
    deploy(&database, &open_backend(&ws), &overrides);

    let service = ws.write(
        "service.yaml",
        &ManifestBuilder::new("service", REGION)
            .local_template("templates/service.yaml")
            .dependent_stack("db", "database")
            .sourced("DbName", "db.Parameters.DbName")
            .sourced("Cidr", "db.Parameters.NetworkCidr")
            .build(),
    );

    let backend = open_backend(&ws);
    let mut manifest = Manifest::load(&service, context(&backend)).unwrap();
    let resolved = manifest
        .resolve_parameters(&ParameterOverrides::new())
        .unwrap();

    assert_eq!(resolved.get("DbName"), Some("orders"));
    assert_eq!(resolved.get("Cidr"), Some("10.0.0.0/16"));
    assert_eq!(resolved.tier("DbName"), Some(Tier::Sourced));
    assert!(resolved.misses().is_empty());
}

#[test]
fn test_manifest_formats_produce_identical_payloads() {
    let ws = TestWorkspace::new();
    deploy_network(&ws);

    ws.write(
        "app.yaml",
        &ManifestBuilder::new("app", REGION)
            .s3_template("https://bucket.example/app.yaml")
            .timeout("30 minutes")
            .parameter("Env", "dev")
            .dependent_stack("net", "network")
            .sourced("Cidr", "net.Parameters.CidrBlock")
            .tag("team", "platform")
            .build(),
    );
    ws.write(
        "app.json",
        r#"{
  "StackName": "app",
  "Region": "us-east-1",
  "S3Template": "https://bucket.example/app.yaml",
  "TimeOut": "30 minutes",
  "Parameters": { "Env": "dev" },
  "DependentStacks": { "net": "network" },
  "SourcedParameters": { "Cidr": "net.Parameters.CidrBlock" },
  "Tags": { "team": "platform" }
}"#,
    );
    ws.write(
        "app.toml",
        r#"StackName = "app"
Region = "us-east-1"
S3Template = "https://bucket.example/app.yaml"
TimeOut = "30 minutes"

[Parameters]
Env = "dev"

[DependentStacks]
net = "network"

[SourcedParameters]
Cidr = "net.Parameters.CidrBlock"

[Tags]
team = "platform"
"#,
    );

    let backend = open_backend(&ws);
    let payloads: Vec<String> = ["app.yaml", "app.json", "app.toml"]
        .iter()
        .map(|file| {
            let mut manifest = Manifest::load(ws.path(file), context(&backend)).unwrap();
            manifest
                .validate(&ParameterOverrides::new())
                .unwrap()
                .to_json_pretty()
                .unwrap()
        })
        .collect();

    assert_eq!(payloads[0], payloads[1]);
    assert_eq!(payloads[0], payloads[2]);
    assert!(payloads[0].contains("\"TimeoutInMinutes\": 30"));
}

#[test]
fn test_region_override_moves_dependency_lookup() {
    let ws = TestWorkspace::new();
    deploy_network(&ws);

    let app = ws.write(
        "app.yaml",
        &ManifestBuilder::new("app", REGION)
            .s3_template("https://bucket.example/app.yaml")
            .dependent_stack("net", "network")
            .sourced("Cidr", "net.Parameters.CidrBlock")
            .build(),
    );

    let backend = open_backend(&ws);
    let mut manifest = Manifest::load(&app, context(&backend)).unwrap();
    manifest.override_option("Region", "eu-west-1");

    let result = manifest.validate(&ParameterOverrides::new());
    assert!(
        matches!(&result, Err(Error::DependentStackNotFound { region, .. }) if region == "eu-west-1"),
        "expected lookup in the overridden region, got {:?}",
        result
    );

    // The document itself is untouched
    assert_eq!(
        manifest.document().get("Region").and_then(|v| v.as_str()),
        Some(REGION)
    );
}

#[test]
fn test_failed_create_leaves_snapshot_unchanged() {
    let ws = TestWorkspace::new();
    deploy_network(&ws);
    let before = ws.read("stacks.yaml");

    let broken = ws.write(
        "broken.yaml",
        &ManifestBuilder::new("broken", REGION)
            .s3_template("https://bucket.example/broken.yaml")
            .dependent_stack("missing", "does-not-exist")
            .sourced("Value", "missing.Outputs.Value")
            .build(),
    );

    let backend = open_backend(&ws);
    let mut manifest = Manifest::load(&broken, context(&backend)).unwrap();
    let stack = manifest.create_stack(&ParameterOverrides::new()).unwrap();
    assert!(stack.is_none());

    assert!(backend.snapshot().unwrap().get(REGION, "broken").is_none());
    assert_eq!(ws.read("stacks.yaml"), before);
}
