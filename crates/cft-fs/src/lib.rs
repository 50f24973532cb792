//! Filesystem layer for cft-deploy
//!
//! Loads and saves structured documents (manifests, stack snapshots) in
//! YAML, JSON or TOML, and provides atomic writes.

pub mod config;
pub mod error;
pub mod io;

pub use config::{ConfigStore, DocumentFormat};
pub use error::{Error, Result};
