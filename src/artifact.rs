//! # Coordinates and Repositories
//!
//! This module defines the value types the local repository layer works with:
//!
//! - **`Artifact`**: an artifact coordinate (group, artifact id, version,
//!   classifier, extension) together with its derived base version.
//! - **`Metadata`**: a metadata coordinate (group, artifact id, version, type).
//! - **`RemoteRepository`**: a remote source an artifact can be fetched from.
//!   A remote repository may be a repository manager that proxies a dynamic set
//!   of mirrored repositories.
//! - **`LocalRepository`**: the root directory of the on-disk cache and its
//!   content type tag.
//!
//! All of these are owned by the caller and are read-only to the managers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Suffix that marks a snapshot base version.
pub const SNAPSHOT: &str = "SNAPSHOT";

/// Timestamped snapshot versions, e.g. `1.0-20240101.120000-3`.
static SNAPSHOT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*-)?([0-9]{8}\.[0-9]{6}-[0-9]+)$")
        .expect("snapshot timestamp pattern is valid")
});

/// Derives the base version of a (possibly timestamped) version.
///
/// A timestamped snapshot `1.0-20240101.120000-3` has the base version
/// `1.0-SNAPSHOT`; every other version is its own base version.
pub fn base_version(version: &str) -> String {
    match SNAPSHOT_TIMESTAMP.captures(version) {
        Some(captures) => {
            let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            format!("{}{}", prefix, SNAPSHOT)
        }
        None => version.to_string(),
    }
}

/// An artifact coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    version: String,
    base_version: String,
    classifier: String,
    extension: String,
}

impl Artifact {
    /// Creates an artifact coordinate, deriving its base version from `version`.
    pub fn new(
        group_id: &str,
        artifact_id: &str,
        classifier: &str,
        extension: &str,
        version: &str,
    ) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            base_version: base_version(version),
            classifier: classifier.to_string(),
            extension: extension.to_string(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// The resolved version, possibly a timestamped snapshot.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_version(&self) -> &str {
        &self.base_version
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_snapshot(&self) -> bool {
        self.base_version.ends_with(SNAPSHOT)
    }

    /// Returns a copy of this artifact with another classifier.
    pub fn with_classifier(&self, classifier: &str) -> Self {
        Self {
            classifier: classifier.to_string(),
            ..self.clone()
        }
    }

    /// Returns a copy of this artifact with another version.
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            version: version.to_string(),
            base_version: base_version(version),
            ..self.clone()
        }
    }
}

/// Parses `group:artifact[:extension[:classifier]]:version`.
///
/// The extension defaults to `jar` when omitted.
impl FromStr for Artifact {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let (group, artifact, extension, classifier, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, "jar", "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => {
                return Err(Error::Coordinate {
                    coordinate: s.to_string(),
                    message: "expected group:artifact[:extension[:classifier]]:version"
                        .to_string(),
                })
            }
        };
        if group.is_empty() || artifact.is_empty() || version.is_empty() {
            return Err(Error::Coordinate {
                coordinate: s.to_string(),
                message: "group, artifact and version must not be empty".to_string(),
            });
        }
        Ok(Artifact::new(group, artifact, classifier, extension, version))
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// A metadata coordinate
///
/// Any of group, artifact id and version may be empty, e.g. group level
/// metadata has neither artifact id nor version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Metadata {
    group_id: String,
    artifact_id: String,
    version: String,
    r#type: String,
}

impl Metadata {
    pub fn new(group_id: &str, artifact_id: &str, version: &str, r#type: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            r#type: r#type.to_string(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The metadata document type, e.g. `maven-metadata.xml`.
    pub fn r#type(&self) -> &str {
        &self.r#type
    }

    pub fn is_snapshot(&self) -> bool {
        !self.version.is_empty() && self.version.ends_with(SNAPSHOT)
    }
}

/// Parses `group:artifact:version:type`; the first three segments may be empty.
impl FromStr for Metadata {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split(':').collect::<Vec<_>>().as_slice() {
            [g, a, v, t] if !t.is_empty() => Ok(Metadata::new(g, a, v, t)),
            _ => Err(Error::Coordinate {
                coordinate: s.to_string(),
                message: "expected group:artifact:version:type with a non-empty type"
                    .to_string(),
            }),
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, self.r#type
        )
    }
}

/// A remote source of artifacts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRepository {
    id: String,
    url: String,
    content_type: String,
    repository_manager: bool,
    mirrored: Vec<RemoteRepository>,
}

impl RemoteRepository {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            content_type: "default".to_string(),
            repository_manager: false,
            mirrored: Vec::new(),
        }
    }

    /// Marks this repository as a repository manager serving the contents of
    /// the given mirrored repositories.
    pub fn with_mirrored(mut self, mirrored: Vec<RemoteRepository>) -> Self {
        self.repository_manager = true;
        self.mirrored = mirrored;
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_repository_manager(&self) -> bool {
        self.repository_manager
    }

    pub fn mirrored(&self) -> &[RemoteRepository] {
        &self.mirrored
    }
}

impl fmt::Display for RemoteRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// The root of the on-disk artifact cache
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalRepository {
    base_path: PathBuf,
    content_type: String,
}

impl LocalRepository {
    /// Creates a local repository rooted at `base_path`.
    ///
    /// The path is made absolute, and canonical when it already exists. An
    /// empty path or a path naming something other than a directory is
    /// rejected.
    pub fn new(base_path: impl AsRef<Path>, content_type: &str) -> Result<Self> {
        let path = base_path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidRepository {
                path: path.to_path_buf(),
                message: "base path is empty".to_string(),
            });
        }
        let absolute = std::path::absolute(path).map_err(|e| Error::InvalidRepository {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let base_path = if absolute.exists() {
            if !absolute.is_dir() {
                return Err(Error::InvalidRepository {
                    path: absolute,
                    message: "base path is not a directory".to_string(),
                });
            }
            absolute.canonicalize()?
        } else {
            absolute
        };
        Ok(Self {
            base_path,
            content_type: content_type.to_string(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The repository type tag used to select a manager, e.g. `enhanced`.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl fmt::Display for LocalRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.base_path.display(), self.content_type)
    }
}
