//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding one source file and room for a destination.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Create a fixture with an empty scratch directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Path of `name` inside the scratch directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `content` to `name` and return its path.
    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write a file of `size` bytes with a non-repeating byte pattern.
    pub fn write_pattern(&self, name: &str, size: usize) -> PathBuf {
        self.write(name, pattern(size))
    }

    /// Check that a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &[u8]) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read(path).expect("Failed to read file");
        assert!(actual == expected, "File content mismatch: {:?}", path);
    }

    /// Number of entries in the scratch directory.
    pub fn entry_count(&self) -> usize {
        fs::read_dir(self.dir.path())
            .expect("Failed to read directory")
            .count()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn pattern(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}
