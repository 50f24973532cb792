//! Collaborator contracts: the Stack Provider and the Provisioning Service
//!
//! The core never talks to the network itself. Anything that can look up a
//! deployed stack, or accept a payload, plugs in through these traits.

use crate::context::Session;
use crate::payload::{StackParameter, StackPayload, TemplateSource};
use std::collections::BTreeMap;

/// Name -> value mapping returned by every stack lookup
pub type ValueMap = BTreeMap<String, String>;

/// Errors reported by collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider has no stack with this name in this region
    #[error("Stack {name} does not exist in {region}")]
    StackNotFound { name: String, region: String },

    /// The remote service rejected or failed the call
    #[error("Provider service error: {message}")]
    Service { message: String },

    /// The collaborator does not implement this operation
    #[error("Operation not supported by this provider: {operation}")]
    Unsupported { operation: String },
}

impl ProviderError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}

/// A live handle on one deployed stack.
///
/// Every call is a fresh query; handles do not cache.
pub trait StackHandle: Send + Sync {
    fn name(&self) -> &str;
    fn region(&self) -> &str;

    /// Current input parameters
    fn parameters(&self) -> Result<ValueMap, ProviderError>;

    /// Output values
    fn outputs(&self) -> Result<ValueMap, ProviderError>;

    /// Logical id -> physical id of every resource
    fn resources(&self) -> Result<ValueMap, ProviderError>;
}

/// Looks up deployed stacks.
pub trait StackProvider: Send + Sync {
    /// Obtain a handle on `name` in `region`.
    ///
    /// Returns [`ProviderError::StackNotFound`] when the stack does not exist.
    fn stack(
        &self,
        name: &str,
        region: &str,
        session: &Session,
    ) -> Result<Box<dyn StackHandle>, ProviderError>;
}

/// Response to a create request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateStackResponse {
    /// Identifier of the new stack; absent when the service did not create one
    pub stack_id: Option<String>,
}

/// Accepts provisioning payloads.
pub trait ProvisioningService: Send + Sync {
    fn create_stack(
        &self,
        region: &str,
        session: &Session,
        payload: &StackPayload,
    ) -> Result<CreateStackResponse, ProviderError>;

    /// Return a URL to a monthly cost estimate for this template and parameter set.
    fn estimate_cost(
        &self,
        region: &str,
        session: &Session,
        template: &TemplateSource,
        parameters: &[StackParameter],
    ) -> Result<String, ProviderError>;
}
