//! Common test utilities for bucketing integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scenario manifest shipped with the tests
pub const APP_MANIFEST: &str = include_str!("../fixtures/app.toml");

/// A temporary build directory holding a manifest
pub struct TestBuildDir {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the build directory root
    pub path: PathBuf,
}

impl TestBuildDir {
    /// Create an empty build directory
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Create a build directory containing the scenario manifest
    pub fn with_app_manifest() -> Self {
        let dir = Self::new();
        dir.write_file("bucket.toml", APP_MANIFEST);
        dir
    }

    /// Write a file in the build directory
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Read a file from the build directory
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Absolute path of something inside the build directory
    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.path.join(path)
    }
}
