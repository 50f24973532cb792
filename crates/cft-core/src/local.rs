//! Snapshot-backed stack provider and provisioning service
//!
//! [`LocalBackend`] keeps a table of known stacks per region, optionally
//! persisted as a snapshot document:
//!
//! ```yaml
//! Stacks:
//!   us-east-1:
//!     my-network-stack:
//!       Parameters: { CidrBlock: 10.0.0.0/16 }
//!       Outputs: { VpcId: vpc-123 }
//!       Resources: { Vpc: vpc-123 }
//! ```
//!
//! Creating a stack registers it with the payload's parameters and tags, so
//! a later manifest can source values from it.

use crate::context::Session;
use crate::payload::{StackParameter, StackPayload, TemplateSource};
use crate::provider::{
    CreateStackResponse, ProviderError, ProvisioningService, StackHandle, StackProvider, ValueMap,
};
use crate::Result;
use cft_fs::ConfigStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One known stack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    #[serde(default)]
    pub parameters: ValueMap,
    #[serde(default)]
    pub outputs: ValueMap,
    #[serde(default)]
    pub resources: ValueMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: ValueMap,
}

impl StackRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn with_resource(mut self, logical_id: impl Into<String>, physical_id: impl Into<String>) -> Self {
        self.resources.insert(logical_id.into(), physical_id.into());
        self
    }
}

/// Snapshot document: region -> stack name -> record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackSnapshot {
    #[serde(default)]
    pub stacks: BTreeMap<String, BTreeMap<String, StackRecord>>,
}

impl StackSnapshot {
    pub fn get(&self, region: &str, name: &str) -> Option<&StackRecord> {
        self.stacks.get(region).and_then(|stacks| stacks.get(name))
    }

    pub fn insert(&mut self, region: impl Into<String>, name: impl Into<String>, record: StackRecord) {
        self.stacks
            .entry(region.into())
            .or_default()
            .insert(name.into(), record);
    }
}

/// In-process stand-in for both remote collaborators
#[derive(Debug, Default)]
pub struct LocalBackend {
    path: Option<PathBuf>,
    state: Arc<Mutex<StackSnapshot>>,
}

impl LocalBackend {
    /// Empty backend that is never persisted
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory backend seeded with `snapshot`
    pub fn from_snapshot(snapshot: StackSnapshot) -> Self {
        Self {
            path: None,
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// Backend persisted at `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = if path.exists() {
            ConfigStore::new().load(path)?
        } else {
            tracing::debug!(?path, "No stack snapshot found, starting empty");
            StackSnapshot::default()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::from_snapshot(snapshot)
        })
    }

    /// Register a stack, replacing any record with the same name.
    pub fn with_stack(self, region: &str, name: &str, record: StackRecord) -> Self {
        // A poisoned table is still a consistent map; keep writing to it
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(region, name, record);
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current stack table
    pub fn snapshot(&self) -> std::result::Result<StackSnapshot, ProviderError> {
        Ok(lock(&self.state)?.clone())
    }

    /// Write the stack table back to its snapshot file, if it has one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            tracing::debug!("Local backend has no snapshot path, nothing saved");
            return Ok(());
        };
        let snapshot = self.snapshot()?;
        ConfigStore::new().save(path, &snapshot)?;
        tracing::info!(?path, "Saved stack snapshot");
        Ok(())
    }
}

fn lock(state: &Mutex<StackSnapshot>) -> std::result::Result<MutexGuard<'_, StackSnapshot>, ProviderError> {
    state
        .lock()
        .map_err(|_| ProviderError::service("local stack table lock poisoned"))
}

/// Handle that re-reads the shared table on every query
struct LocalStackHandle {
    name: String,
    region: String,
    state: Arc<Mutex<StackSnapshot>>,
}

impl LocalStackHandle {
    fn read(&self, pick: impl Fn(&StackRecord) -> &ValueMap) -> std::result::Result<ValueMap, ProviderError> {
        let state = lock(&self.state)?;
        state
            .get(&self.region, &self.name)
            .map(|record| pick(record).clone())
            .ok_or_else(|| ProviderError::StackNotFound {
                name: self.name.clone(),
                region: self.region.clone(),
            })
    }
}

impl StackHandle for LocalStackHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn parameters(&self) -> std::result::Result<ValueMap, ProviderError> {
        self.read(|r| &r.parameters)
    }

    fn outputs(&self) -> std::result::Result<ValueMap, ProviderError> {
        self.read(|r| &r.outputs)
    }

    fn resources(&self) -> std::result::Result<ValueMap, ProviderError> {
        self.read(|r| &r.resources)
    }
}

impl StackProvider for LocalBackend {
    fn stack(
        &self,
        name: &str,
        region: &str,
        _session: &Session,
    ) -> std::result::Result<Box<dyn StackHandle>, ProviderError> {
        if lock(&self.state)?.get(region, name).is_none() {
            return Err(ProviderError::StackNotFound {
                name: name.to_string(),
                region: region.to_string(),
            });
        }

        Ok(Box::new(LocalStackHandle {
            name: name.to_string(),
            region: region.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

impl ProvisioningService for LocalBackend {
    fn create_stack(
        &self,
        region: &str,
        _session: &Session,
        payload: &StackPayload,
    ) -> std::result::Result<CreateStackResponse, ProviderError> {
        let mut state = lock(&self.state)?;
        if state.get(region, &payload.stack_name).is_some() {
            return Err(ProviderError::service(format!(
                "Stack [{}] already exists",
                payload.stack_name
            )));
        }

        let stack_id = format!("local:{}:{}", region, payload.stack_name);
        let record = StackRecord {
            stack_id: Some(stack_id.clone()),
            parameters: payload
                .parameters
                .iter()
                .map(|p| (p.parameter_key.clone(), p.parameter_value.clone()))
                .collect(),
            outputs: ValueMap::new(),
            resources: ValueMap::new(),
            tags: payload
                .tags
                .iter()
                .map(|t| (t.key.clone(), t.value.clone()))
                .collect(),
        };
        state.insert(region, payload.stack_name.clone(), record);
        tracing::debug!(%stack_id, "Registered stack in local backend");

        Ok(CreateStackResponse {
            stack_id: Some(stack_id),
        })
    }

    fn estimate_cost(
        &self,
        _region: &str,
        _session: &Session,
        _template: &TemplateSource,
        _parameters: &[StackParameter],
    ) -> std::result::Result<String, ProviderError> {
        Err(ProviderError::Unsupported {
            operation: "estimate_cost".to_string(),
        })
    }
}
