//! [`TestWorkspace`] scratch directory for manifest, template and snapshot files.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Smallest template body the tests deploy
pub const MINIMAL_TEMPLATE: &str = "AWSTemplateFormatVersion: '2010-09-09'\nResources:\n  Bucket:\n    Type: AWS::S3::Bucket\n";

/// A temporary directory with helpers for writing fixtures and asserting on
/// their contents.
///
/// # Example
///
/// ```rust,no_run
/// use cft_test_utils::{ManifestBuilder, TestWorkspace};
///
/// let ws = TestWorkspace::new();
/// ws.write_template("template.yaml");
/// let manifest = ws.write(
///     "manifest.yaml",
///     &ManifestBuilder::new("my-app", "us-east-1").local_template("template.yaml").build(),
/// );
/// ws.assert_file_exists("manifest.yaml");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the workspace
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write [`MINIMAL_TEMPLATE`] to `relative`.
    pub fn write_template(&self, relative: &str) -> PathBuf {
        self.write(relative, MINIMAL_TEMPLATE)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub fn assert_file_exists(&self, relative: &str) {
        assert!(
            self.path(relative).exists(),
            "Expected file to exist: {}",
            relative
        );
    }

    pub fn assert_file_contains(&self, relative: &str, needle: &str) {
        let content = self.read(relative);
        assert!(
            content.contains(needle),
            "Expected {} to contain {:?}, got:\n{}",
            relative,
            needle,
            content
        );
    }
}
