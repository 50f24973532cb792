#![allow(dead_code)]

use cft_core::{
    CreateStackResponse, ExecutionContext, LocalBackend, ProviderError, ProvisioningService,
    Section, Session, StackHandle, StackParameter, StackPayload, StackProvider, StackRecord,
    TemplateSource, ValueMap,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

pub const REGION: &str = "us-east-1";

/// Stack provider over a [`LocalBackend`] that records every stack it opens
/// and can be told to fail.
pub struct ScriptedStacks {
    inner: LocalBackend,
    failing_sections: BTreeSet<(String, Section)>,
    unavailable: bool,
    opened: Mutex<Vec<String>>,
}

impl ScriptedStacks {
    pub fn new() -> Self {
        Self {
            inner: LocalBackend::new(),
            failing_sections: BTreeSet::new(),
            unavailable: false,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn with_stack(mut self, name: &str, record: StackRecord) -> Self {
        self.inner = self.inner.with_stack(REGION, name, record);
        self
    }

    /// Make `section` lookups on `stack` fail with a service error.
    pub fn failing(mut self, stack: &str, section: Section) -> Self {
        self.failing_sections.insert((stack.to_string(), section));
        self
    }

    /// Make every stack lookup fail with a service error.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl StackProvider for ScriptedStacks {
    fn stack(
        &self,
        name: &str,
        region: &str,
        session: &Session,
    ) -> Result<Box<dyn StackHandle>, ProviderError> {
        self.opened.lock().unwrap().push(name.to_string());
        if self.unavailable {
            return Err(ProviderError::service("rate exceeded"));
        }

        let inner = self.inner.stack(name, region, session)?;
        let failing = self
            .failing_sections
            .iter()
            .filter(|(stack, _)| stack == name)
            .map(|(_, section)| *section)
            .collect();
        Ok(Box::new(ScriptedHandle { inner, failing }))
    }
}

struct ScriptedHandle {
    inner: Box<dyn StackHandle>,
    failing: BTreeSet<Section>,
}

impl ScriptedHandle {
    fn guard(&self, section: Section) -> Result<(), ProviderError> {
        if self.failing.contains(&section) {
            return Err(ProviderError::service(format!("{} lookup failed", section)));
        }
        Ok(())
    }
}

impl StackHandle for ScriptedHandle {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn region(&self) -> &str {
        self.inner.region()
    }

    fn parameters(&self) -> Result<ValueMap, ProviderError> {
        self.guard(Section::Parameters)?;
        self.inner.parameters()
    }

    fn outputs(&self) -> Result<ValueMap, ProviderError> {
        self.guard(Section::Outputs)?;
        self.inner.outputs()
    }

    fn resources(&self) -> Result<ValueMap, ProviderError> {
        self.guard(Section::Resources)?;
        self.inner.resources()
    }
}

/// Provisioning service that answers with a fixed response and records
/// every payload it is sent.
pub struct ScriptedProvisioning {
    response: Result<CreateStackResponse, ProviderError>,
    estimate_url: String,
    submitted: Mutex<Vec<StackPayload>>,
    estimated: Mutex<Vec<Vec<StackParameter>>>,
}

impl ScriptedProvisioning {
    pub fn returning(stack_id: Option<&str>) -> Self {
        Self {
            response: Ok(CreateStackResponse {
                stack_id: stack_id.map(str::to_string),
            }),
            estimate_url: "https://calculator.example/estimate#abc".to_string(),
            submitted: Mutex::new(Vec::new()),
            estimated: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(ProviderError::service(message)),
            ..Self::returning(None)
        }
    }

    pub fn submitted(&self) -> Vec<StackPayload> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn estimated(&self) -> Vec<Vec<StackParameter>> {
        self.estimated.lock().unwrap().clone()
    }

    pub fn estimate_url(&self) -> &str {
        &self.estimate_url
    }
}

impl ProvisioningService for ScriptedProvisioning {
    fn create_stack(
        &self,
        _region: &str,
        _session: &Session,
        payload: &StackPayload,
    ) -> Result<CreateStackResponse, ProviderError> {
        self.submitted.lock().unwrap().push(payload.clone());
        self.response.clone()
    }

    fn estimate_cost(
        &self,
        _region: &str,
        _session: &Session,
        _template: &TemplateSource,
        parameters: &[StackParameter],
    ) -> Result<String, ProviderError> {
        self.estimated.lock().unwrap().push(parameters.to_vec());
        Ok(self.estimate_url.clone())
    }
}

pub fn context(stacks: Arc<ScriptedStacks>, provisioning: Arc<ScriptedProvisioning>) -> ExecutionContext {
    ExecutionContext::new(Session::new(), stacks, provisioning)
}

/// The network stack most tests depend on
pub fn network_stack() -> StackRecord {
    StackRecord::new()
        .with_parameter("CidrBlock", "10.0.0.0/16")
        .with_output("VpcId", "vpc-123")
        .with_output("SubnetId", "subnet-456")
        .with_resource("Vpc", "vpc-123")
}
