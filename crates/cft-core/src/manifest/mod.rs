//! Deployment manifests
//!
//! A [`Manifest`] holds the parsed deployment intent for one stack, resolves
//! its parameters through the [`DependencyResolver`] and assembles the
//! provisioning payload.
//!
//! # Example
//!
//! ```ignore
//! use cft_core::{ExecutionContext, LocalBackend, Manifest, ParameterOverrides, Session};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(LocalBackend::open("stacks.yaml")?);
//! let ctx = ExecutionContext::local(Session::new(), backend);
//!
//! let mut manifest = Manifest::load("manifest.yaml", ctx)?;
//! manifest.override_option("Region", "eu-west-1");
//! let payload = manifest.validate(&ParameterOverrides::new())?;
//! println!("{}", payload.to_json_pretty()?);
//! ```

mod document;

pub use document::{Document, ManifestSpec, OptionOverrides};

use crate::context::ExecutionContext;
use crate::payload::{
    NAMED_IAM_CAPABILITY, StackPayload, Tag, TemplateSource, parse_timeout, stack_policy_body,
};
use crate::provider::StackHandle;
use crate::resolver::{DependencyResolver, ParameterOverrides, ResolvedParameters};
use crate::template::Template;
use crate::value::scalar_string;
use crate::{Error, Result};
use cft_fs::{ConfigStore, DocumentFormat};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// A deployment manifest bound to an execution context
#[derive(Debug)]
pub struct Manifest {
    document: Document,
    overrides: OptionOverrides,
    ctx: ExecutionContext,
    resolved: Option<ResolvedParameters>,
}

impl Manifest {
    /// Load a manifest file.
    ///
    /// `.json` and `.toml` files are parsed as such; anything else is read
    /// as YAML.
    ///
    /// A malformed document is logged and returned as [`Error::Parse`];
    /// aborting is left to the caller.
    pub fn load(path: impl AsRef<Path>, ctx: ExecutionContext) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let value: Value = ConfigStore::new()
            .load_or(path, DocumentFormat::Yaml)
            .map_err(|e| match e {
            cft_fs::Error::Parse { message, .. } => {
                tracing::error!(manifest = %origin, %message, "Unable to parse manifest file. Aborting");
                Error::Parse {
                    origin: origin.clone(),
                    message,
                }
            }
            other => Error::Fs(other),
        })?;

        let base_dir = path.parent().map(Path::to_path_buf);
        Self::from_document(Document::from_value(value, origin, base_dir)?, ctx)
    }

    /// Parse a YAML manifest held in memory.
    pub fn parse(content: &str, ctx: ExecutionContext) -> Result<Self> {
        let origin = "<inline>";
        let value: Value = serde_yaml::from_str(content).map_err(|e| {
            tracing::error!(manifest = origin, error = %e, "Unable to parse manifest. Aborting");
            Error::Parse {
                origin: origin.to_string(),
                message: e.to_string(),
            }
        })?;
        Self::from_document(Document::from_value(value, origin, None)?, ctx)
    }

    /// Wrap a parsed document, checking that the required fields are present.
    pub fn from_document(document: Document, ctx: ExecutionContext) -> Result<Self> {
        let manifest = Self {
            document,
            overrides: OptionOverrides::default(),
            ctx,
            resolved: None,
        };
        match manifest.spec() {
            // Surfaces again when parameters are resolved
            Ok(_) | Err(Error::UnsupportedLegacyField { .. }) => Ok(manifest),
            Err(e) => Err(e),
        }
    }

    /// Set a top-level field, winning over the manifest file's value.
    ///
    /// Nothing is validated until the field is read.
    pub fn override_option(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.overrides.set(key, value);
    }

    /// Current typed view: the document with option overrides applied
    pub fn spec(&self) -> Result<ManifestSpec> {
        ManifestSpec::read(&self.document, &self.overrides)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn stack_name(&self) -> Result<String> {
        Ok(self.spec()?.stack_name)
    }

    pub fn region(&self) -> Result<String> {
        Ok(self.spec()?.region)
    }

    /// Parameters from the last successful [`Manifest::resolve_parameters`]
    pub fn resolved(&self) -> Option<&ResolvedParameters> {
        self.resolved.as_ref()
    }

    /// Resolve local, sourced and override parameters and keep the result.
    ///
    /// Individual references that cannot be satisfied are logged and left
    /// out. Structural errors abort and clear any earlier result.
    pub fn resolve_parameters(&mut self, overrides: &ParameterOverrides) -> Result<&ResolvedParameters> {
        self.resolved = None;
        let spec = self.spec()?;

        let span = self.ctx.span().clone();
        let _guard = span.enter();

        let resolved = DependencyResolver::new(&self.ctx, &spec.region)
            .resolve(&spec.parameter_sources(), overrides)?;
        Ok(&*self.resolved.insert(resolved))
    }

    /// Assemble the provisioning payload.
    ///
    /// Uses the parameters of the last resolution, or none if parameters
    /// were never resolved. `LocalTemplate` is preferred when both template
    /// sources are present; [`Manifest::validate`] rejects that case.
    pub fn build_payload(&self) -> Result<StackPayload> {
        let spec = self.spec()?;

        let template = self.template_source(&spec)?;

        let timeout_in_minutes = spec.time_out.as_ref().map(parse_timeout).transpose()?;
        let policy_body = spec.stack_policy.as_ref().map(stack_policy_body).transpose()?;

        let mut tags = Vec::new();
        for (key, value) in spec.tags.iter().flatten() {
            match scalar_string(value) {
                Some(value) => tags.push(Tag {
                    key: key.clone(),
                    value,
                }),
                None => tracing::warn!(tag = %key, "Tag has no string value and will be ignored"),
            }
        }

        let parameters = self
            .resolved
            .as_ref()
            .map(ResolvedParameters::to_stack_parameters)
            .unwrap_or_default();

        Ok(StackPayload {
            stack_name: spec.stack_name,
            parameters,
            timeout_in_minutes,
            capabilities: vec![NAMED_IAM_CAPABILITY.to_string()],
            on_failure: spec.on_failure,
            stack_policy_body: policy_body,
            tags,
            enable_termination_protection: spec.termination_protection.unwrap_or(false),
            template,
        })
    }

    /// Resolve parameters and build the payload without submitting it.
    pub fn validate(&mut self, overrides: &ParameterOverrides) -> Result<StackPayload> {
        self.spec()?;
        if self.declares("LocalTemplate") && self.declares("S3Template") {
            tracing::error!(manifest = %self.document.origin(), "Manifest contains both 'LocalTemplate' and 'S3Template'");
            return Err(Error::ConflictingTemplateSource);
        }

        self.resolve_parameters(overrides)?;
        self.build_payload()
    }

    /// Resolve, build and submit the payload to the provisioning service.
    ///
    /// Returns `Ok(None)`, after logging, when a dependent stack cannot be
    /// found, the service fails or returns no stack id, or the new stack
    /// cannot be looked up. Manifest errors still propagate.
    pub fn create_stack(&mut self, overrides: &ParameterOverrides) -> Result<Option<Box<dyn StackHandle>>> {
        let spec = self.spec()?;

        let span = self.ctx.span().clone();
        let _guard = span.enter();
        tracing::info!(stack = %spec.stack_name, region = %spec.region, "Creating stack");

        match self.resolve_parameters(overrides) {
            Ok(_) => {}
            Err(e @ (Error::DependentStackNotFound { .. } | Error::Provider(_))) => {
                tracing::error!(
                    stack = %spec.stack_name,
                    region = %spec.region,
                    error = %e,
                    "Could not resolve parameters for new stack"
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let payload = self.build_payload()?;

        let response = match self
            .ctx
            .provisioning()
            .create_stack(&spec.region, self.ctx.session(), &payload)
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    stack = %spec.stack_name,
                    region = %spec.region,
                    error = %e,
                    "Error attempting to create stack"
                );
                return Ok(None);
            }
        };

        let Some(stack_id) = response.stack_id else {
            tracing::error!(stack = %spec.stack_name, "Unable to create stack");
            return Ok(None);
        };
        tracing::info!(stack = %spec.stack_name, %stack_id, "Stack created");

        match self
            .ctx
            .stacks()
            .stack(&spec.stack_name, &spec.region, self.ctx.session())
        {
            Ok(handle) => Ok(Some(handle)),
            Err(e) => {
                tracing::error!(
                    stack = %spec.stack_name,
                    region = %spec.region,
                    error = %e,
                    "Could not find new stack"
                );
                Ok(None)
            }
        }
    }

    /// Ask the provisioning service for a monthly cost estimate URL.
    ///
    /// Parameters are resolved without overrides.
    pub fn estimate_cost(&mut self) -> Result<String> {
        self.resolve_parameters(&ParameterOverrides::new())?;
        let spec = self.spec()?;
        let template = self.template_source(&spec)?;
        let parameters = self
            .resolved
            .as_ref()
            .map(ResolvedParameters::to_stack_parameters)
            .unwrap_or_default();

        let url = self.ctx.provisioning().estimate_cost(
            &spec.region,
            self.ctx.session(),
            &template,
            &parameters,
        )?;
        Ok(url)
    }

    fn declares(&self, key: &str) -> bool {
        self.overrides.declares(&self.document, key)
    }

    fn template_source(&self, spec: &ManifestSpec) -> Result<TemplateSource> {
        if let Some(path) = &spec.local_template {
            let template = Template::read(self.template_path(path))?;
            Ok(TemplateSource::TemplateBody(template.into_body()))
        } else if let Some(url) = &spec.s3_template {
            Ok(TemplateSource::TemplateUrl(url.clone()))
        } else {
            tracing::error!(manifest = %self.document.origin(), "Neither 'LocalTemplate' nor 'S3Template' found in manifest");
            Err(Error::TemplateSource)
        }
    }

    /// Relative template paths are relative to the manifest file.
    fn template_path(&self, path: &Path) -> PathBuf {
        match self.document.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
