//! Execution context passed explicitly to every operation

use crate::local::LocalBackend;
use crate::provider::{ProvisioningService, StackProvider};
use std::fmt;
use std::sync::Arc;
use tracing::Span;

/// Provider session handle
///
/// Carries the credentials profile the collaborators should use. The core
/// only threads it through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    profile: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}

/// Everything an operation needs from the outside world
///
/// Bundles the session, both collaborators and the tracing span that scopes
/// every diagnostic the core emits.
#[derive(Clone)]
pub struct ExecutionContext {
    session: Session,
    stacks: Arc<dyn StackProvider>,
    provisioning: Arc<dyn ProvisioningService>,
    span: Span,
}

impl ExecutionContext {
    pub fn new(
        session: Session,
        stacks: Arc<dyn StackProvider>,
        provisioning: Arc<dyn ProvisioningService>,
    ) -> Self {
        let span = tracing::info_span!(
            "cft_deploy",
            profile = session.profile().unwrap_or("default")
        );
        Self {
            session,
            stacks,
            provisioning,
            span,
        }
    }

    /// Context where one [`LocalBackend`] plays both collaborator roles
    pub fn local(session: Session, backend: Arc<LocalBackend>) -> Self {
        Self::new(session, backend.clone(), backend)
    }

    /// Replace the span diagnostics are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stacks(&self) -> &dyn StackProvider {
        self.stacks.as_ref()
    }

    pub fn provisioning(&self) -> &dyn ProvisioningService {
        self.provisioning.as_ref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
