//! # Session Configuration
//!
//! A read-only key/value lookup supplying the tunables of the local repository
//! layer: prefix-split flags and prefix strings, the tracking file name, and
//! selection overrides for the component selector.
//!
//! Configuration is built once per session, either programmatically with
//! [`SessionConfig::set`] or from a flat YAML mapping:
//!
//! ```yaml
//! local-repository.tracking-filename: _remote.repositories
//! local-repository.enhanced.split: true
//! selector.local-repository-manager.order: simple
//! ```
//!
//! Values are stored as strings and interpreted by the typed accessors, so a
//! YAML boolean and the string `"true"` are equivalent.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Well-known configuration keys.
pub mod keys {
    /// Name of the tracking side-file kept in every cache directory.
    pub const TRACKING_FILENAME: &str = "local-repository.tracking-filename";

    /// Split the repository into an installed and a cached branch.
    pub const SPLIT: &str = "local-repository.enhanced.split";
    /// Root segment of the installed branch.
    pub const LOCAL_PREFIX: &str = "local-repository.enhanced.localPrefix";
    /// Split the installed branch into releases and snapshots.
    pub const SPLIT_LOCAL: &str = "local-repository.enhanced.splitLocal";
    pub const LOCAL_RELEASES_PREFIX: &str = "local-repository.enhanced.localReleasesPrefix";
    pub const LOCAL_SNAPSHOTS_PREFIX: &str = "local-repository.enhanced.localSnapshotsPrefix";
    /// Root segment of the cached branch.
    pub const REMOTE_PREFIX: &str = "local-repository.enhanced.remotePrefix";
    /// Split the cached branch into releases and snapshots.
    pub const SPLIT_REMOTE: &str = "local-repository.enhanced.splitRemote";
    pub const REMOTE_RELEASES_PREFIX: &str = "local-repository.enhanced.remoteReleasesPrefix";
    pub const REMOTE_SNAPSHOTS_PREFIX: &str = "local-repository.enhanced.remoteSnapshotsPrefix";
    /// Split the cached branch by remote repository id.
    pub const SPLIT_REMOTE_REPOSITORY: &str = "local-repository.enhanced.splitRemoteRepository";
    /// Place the repository id segment after the release/snapshot segment.
    pub const SPLIT_REMOTE_REPOSITORY_LAST: &str =
        "local-repository.enhanced.splitRemoteRepositoryLast";

    /// Prefix of the selector keys, followed by the selection namespace.
    pub const SELECTOR_PREFIX: &str = "selector";
}

/// Default name of the tracking side-file.
pub const DEFAULT_TRACKING_FILENAME: &str = "_remote.repositories";

/// Read-only session configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    properties: BTreeMap<String, String>,
}

impl SessionConfig {
    /// Creates an empty configuration where every accessor yields its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, replacing any previous value.
    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// Parses a flat YAML mapping of scalar values.
    ///
    /// Nested mappings and sequences are not supported and are skipped with a
    /// warning; a `null` value is treated as absent.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mapping: BTreeMap<String, Value> = serde_yaml::from_str(content)?;
        let mut properties = BTreeMap::new();
        for (key, value) in mapping {
            let text = match value {
                Value::Null => continue,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s,
                _ => {
                    warn!("Ignoring non-scalar configuration value for '{}'", key);
                    continue;
                }
            };
            properties.insert(key, text);
        }
        Ok(Self { properties })
    }

    /// Loads a configuration file, see [`SessionConfig::from_yaml_str`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Applies `KEY=VALUE` overrides on top of this configuration.
    pub fn with_overrides<'a>(mut self, overrides: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        for entry in overrides {
            let (key, value) = entry.split_once('=').ok_or_else(|| Error::Config {
                key: entry.to_string(),
                message: "expected KEY=VALUE".to_string(),
            })?;
            self.properties
                .insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(self)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or(default).to_string()
    }

    /// Reads a boolean; `true`/`false` in any case are accepted.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get_string(key) {
            None => Ok(default),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
            Some(value) => Err(Error::Config {
                key: key.to_string(),
                message: format!("expected a boolean, got '{}'", value),
            }),
        }
    }

    pub fn get_f32(&self, key: &str) -> Result<Option<f32>> {
        match self.get_string(key) {
            None => Ok(None),
            Some(value) => value.trim().parse().map(Some).map_err(|_| Error::Config {
                key: key.to_string(),
                message: format!("expected a number, got '{}'", value),
            }),
        }
    }

    /// Reads a comma separated list, skipping blank items.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get_string(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the tracking file name, validated to be a plain file name.
    pub fn tracking_filename(&self) -> Result<String> {
        let name = self.get_string_or(keys::TRACKING_FILENAME, DEFAULT_TRACKING_FILENAME);
        let name = name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Error::Config {
                key: keys::TRACKING_FILENAME.to_string(),
                message: format!("'{}' is not a plain file name", name),
            });
        }
        Ok(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = SessionConfig::new();
        assert!(config.is_empty());
        assert_eq!(config.get_string("missing"), None);
        assert!(!config.get_bool(keys::SPLIT, false).unwrap());
        assert_eq!(config.get_f32("missing").unwrap(), None);
        assert!(config.get_list("missing").is_empty());
        assert_eq!(config.tracking_filename().unwrap(), DEFAULT_TRACKING_FILENAME);
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
local-repository.enhanced.split: true
local-repository.enhanced.localPrefix: "mine"
selector.local-repository-manager.priority.simple: 20
ignored: ~
"#;
        let config = SessionConfig::from_yaml_str(yaml).unwrap();
        assert!(config.get_bool(keys::SPLIT, false).unwrap());
        assert_eq!(config.get_string(keys::LOCAL_PREFIX), Some("mine"));
        assert_eq!(
            config
                .get_f32("selector.local-repository-manager.priority.simple")
                .unwrap(),
            Some(20.0)
        );
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_from_yaml_str_skips_nested_values() {
        let yaml = "plain: x\nnested:\n  a: 1\n";
        let config = SessionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.get_string("plain"), Some("x"));
        assert_eq!(config.get_string("nested"), None);
    }

    #[test]
    fn test_from_yaml_str_rejects_invalid_yaml() {
        assert!(matches!(
            SessionConfig::from_yaml_str("[unclosed"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_get_bool_rejects_garbage() {
        let config = SessionConfig::new().set(keys::SPLIT, "maybe");
        let err = config.get_bool(keys::SPLIT, false).unwrap_err();
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_get_bool_is_case_insensitive() {
        let config = SessionConfig::new().set(keys::SPLIT, "TRUE");
        assert!(config.get_bool(keys::SPLIT, false).unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = SessionConfig::new()
            .set("a", "1")
            .with_overrides(["a=2", "b = x,y"])
            .unwrap();
        assert_eq!(config.get_string("a"), Some("2"));
        assert_eq!(config.get_list("b"), vec!["x", "y"]);

        assert!(SessionConfig::new().with_overrides(["novalue"]).is_err());
    }

    #[test]
    fn test_get_list_skips_blanks() {
        let config = SessionConfig::new().set("order", " enhanced, ,simple ,");
        assert_eq!(config.get_list("order"), vec!["enhanced", "simple"]);
    }

    #[test]
    fn test_tracking_filename_validation() {
        let config = SessionConfig::new().set(keys::TRACKING_FILENAME, "_tracking");
        assert_eq!(config.tracking_filename().unwrap(), "_tracking");

        for bad in ["", "..", "a/b", "a\\b"] {
            let config = SessionConfig::new().set(keys::TRACKING_FILENAME, bad);
            assert!(config.tracking_filename().is_err(), "accepted {:?}", bad);
        }
    }
}
