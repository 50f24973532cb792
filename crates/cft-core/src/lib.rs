//! Core of cft-deploy
//!
//! Turns a declarative stack manifest into a provisioning payload:
//!
//! - **Manifest**: parsed deployment intent with a separate option-override layer
//! - **Dependency resolution**: literal, sourced (cross-stack) and override
//!   parameters merged under strict precedence
//! - **Payload assembly**: the exact request body the provisioning service takes
//! - **Collaborator contracts**: [`StackProvider`] and [`ProvisioningService`],
//!   with a snapshot-backed [`LocalBackend`] implementing both
//!
//! # Architecture
//!
//! ```text
//!              cft-cli
//!                 |
//!             cft-core
//!      manifest -> resolver -> provider (trait)
//!                 |
//!              cft-fs
//! ```

pub mod context;
pub mod error;
pub mod local;
pub mod manifest;
pub mod payload;
pub mod provider;
pub mod resolver;
pub mod template;
pub mod value;

pub use context::{ExecutionContext, Session};
pub use error::{Error, Result};
pub use local::{LocalBackend, StackRecord, StackSnapshot};
pub use manifest::{Document, Manifest, ManifestSpec, OptionOverrides};
pub use payload::{StackParameter, StackPayload, Tag, TemplateSource};
pub use provider::{
    CreateStackResponse, ProviderError, ProvisioningService, StackHandle, StackProvider, ValueMap,
};
pub use resolver::{
    DependencyResolver, Miss, ParameterOverrides, ParameterSources, ResolvedParameter,
    ResolvedParameters, Section, SourceReference, Tier,
};
pub use template::Template;
