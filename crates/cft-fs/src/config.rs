//! Format-agnostic document loading and saving

use crate::{Error, Result, io};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::path::Path;

/// Structured document formats understood by [`ConfigStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    ///
    /// - `.yaml`, `.yml` -> YAML
    /// - `.json` -> JSON
    /// - `.toml` -> TOML
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
            Self::Toml => write!(f, "TOML"),
        }
    }
}

/// Format-agnostic document store.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently.
#[derive(Debug, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file, choosing the parser by extension.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let format = DocumentFormat::from_path(path)?;
        let content = io::read_text(path)?;
        tracing::debug!(?path, %format, "Loading document");
        self.parse(&content, format, path)
    }

    /// Like [`ConfigStore::load`], but parse as `fallback` when the file has
    /// no extension or one that is not recognised.
    pub fn load_or<T: DeserializeOwned>(&self, path: &Path, fallback: DocumentFormat) -> Result<T> {
        let format = DocumentFormat::from_path(path).unwrap_or(fallback);
        let content = io::read_text(path)?;
        tracing::debug!(?path, %format, "Loading document");
        self.parse(&content, format, path)
    }

    /// Parse already-read content. `origin` is only used for error reporting.
    pub fn parse<T: DeserializeOwned>(
        &self,
        content: &str,
        format: DocumentFormat,
        origin: &Path,
    ) -> Result<T> {
        let parsed = match format {
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::Parse {
            path: origin.to_path_buf(),
            format: format.to_string(),
            message,
        })
    }

    /// Save a document to a file, choosing the serializer by extension.
    ///
    /// Uses an atomic write so a crash never leaves a truncated document.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let format = DocumentFormat::from_path(path)?;

        let content = match format {
            DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            DocumentFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
        }
        .map_err(|message| Error::Serialize {
            path: path.to_path_buf(),
            format: format.to_string(),
            message,
        })?;

        io::write_text(path, &content)
    }
}
