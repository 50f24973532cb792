//! Local template files

use crate::Result;
use std::path::{Path, PathBuf};

/// A template read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    path: PathBuf,
    body: String,
}

impl Template {
    /// Read the template body as text.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, "Reading local template");
        let body = cft_fs::io::read_text(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            body,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
