//! Error types for cft-core

use crate::provider::ProviderError;

/// Result type for cft-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cft-core operations
///
/// Only structural problems surface here. Misses on individual sourced
/// parameters are recorded on the resolved set instead (see
/// [`crate::resolver::Miss`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest document is not well-formed structured data
    #[error("Unable to parse manifest {origin}: {message}")]
    Parse { origin: String, message: String },

    /// Manifest parsed but its fields have the wrong shape
    #[error("Invalid manifest {origin}: {message}")]
    InvalidManifest { origin: String, message: String },

    /// Both `LocalTemplate` and `S3Template` are declared
    #[error("Manifest contains both 'LocalTemplate' and 'S3Template'")]
    ConflictingTemplateSource,

    /// Neither `LocalTemplate` nor `S3Template` is declared
    #[error("Neither 'LocalTemplate' nor 'S3Template' found in manifest")]
    TemplateSource,

    /// A field that is no longer supported is present
    #[error("Manifest field '{field}' is no longer supported; use DependentStacks and SourcedParameters")]
    UnsupportedLegacyField { field: String },

    /// A declared dependent stack does not exist
    #[error("Dependent stack {stack} (aliased as {alias}) not found in {region}")]
    DependentStackNotFound {
        alias: String,
        stack: String,
        region: String,
    },

    /// A sourced parameter reference is not of the form `alias.section.id`
    #[error("Malformed reference '{reference}' for parameter {parameter}: expected alias.section.id")]
    MalformedReference { parameter: String, reference: String },

    /// `TimeOut` carries no usable number of minutes
    #[error("Invalid TimeOut value '{value}'")]
    InvalidTimeout { value: String },

    /// Collaborator failure that aborts the operation
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Filesystem error from cft-fs
    #[error(transparent)]
    Fs(#[from] cft_fs::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
