//! Default values for local-repo configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Directory under the home directory holding local-repo state.
pub const DEFAULT_HOME_DIRNAME: &str = ".local-repo";

/// Returns the default local repository directory.
///
/// Uses `~/.local-repo/repository`, falling back to `.local-repo/repository`
/// in the current directory if the home directory cannot be determined.
///
/// This can be overridden by the `--local-repo` CLI flag or the `LOCAL_REPO`
/// environment variable.
pub fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIRNAME)
        .join("repository")
}
