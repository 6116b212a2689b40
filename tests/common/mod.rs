//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture holding a temporary local repository and
//! helpers to place artifact files in it and to run the `local-repo` binary
//! against it.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("com/example/lib/1.0/lib-1.0.jar", "jar");
//!     fixture.command().args(["find", "com.example:lib:1.0"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Installed and cached branches, one directory per remote repository.
    pub const SPLIT: &str = r#"
local-repository.enhanced.split: true
local-repository.enhanced.splitRemoteRepository: true
"#;

    /// A custom tracking file name.
    pub const CUSTOM_TRACKING: &str = r#"
local-repository.tracking-filename: _origin.properties
"#;

    /// Prefer the simple manager for untyped repositories.
    pub const PREFER_SIMPLE: &str = r#"
selector.local-repository-manager.order: simple
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "invalid: yaml: content:";
}

/// A test fixture holding a temporary local repository.
///
/// The repository lives in `repo/` below the temporary directory, so the
/// directory itself is free for configuration files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty repository directory.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("repo")
            .create_dir_all()
            .expect("Failed to create repository directory");
        Self { temp_dir }
    }

    /// Add a `local-repo.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("local-repo.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file at the given repository relative path.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.place(path, content);
        self
    }

    /// Write a file at the given repository relative path.
    pub fn place(&self, path: &str, content: &str) {
        self.temp_dir
            .child("repo")
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
    }

    /// Path of the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the local repository.
    pub fn repo_path(&self) -> PathBuf {
        self.temp_dir.path().join("repo")
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("local-repo.yaml")
    }

    /// Create a child path of the repository.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child("repo").child(path)
    }

    /// Create a command running against this fixture's repository.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("local-repo");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--local-repo")
            .arg(self.repo_path());
        cmd
    }

    /// Create a command that also loads the configuration file.
    pub fn command_with_config(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_repository_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.repo_path().is_dir());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("g/a/1/a-1.jar", "jar");
        assert!(fixture.repo_path().join("g/a/1/a-1.jar").is_file());
    }

    #[test]
    fn test_configs_are_valid_yaml() {
        for config in [configs::SPLIT, configs::CUSTOM_TRACKING, configs::PREFER_SIMPLE] {
            let result: Result<serde_yaml::Value, _> = serde_yaml::from_str(config);
            assert!(result.is_ok(), "Config should be valid YAML: {}", config);
        }
    }
}
