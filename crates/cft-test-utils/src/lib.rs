//! Shared test utilities for the cft-deploy workspace.
//!
//! This crate provides standardised fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`manifest`] - [`ManifestBuilder`] for manifest documents
//! - [`workspace`] - [`TestWorkspace`] scratch directory with file helpers

pub mod manifest;
pub mod workspace;

pub use manifest::ManifestBuilder;
pub use workspace::{MINIMAL_TEMPLATE, TestWorkspace};
