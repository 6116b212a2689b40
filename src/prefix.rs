//! # Path Prefix Composition
//!
//! A prefix composer nests the paths produced by [`crate::path::PathComposer`]
//! under extra directories, which lets one local repository keep locally
//! installed artifacts apart from cached downloads, releases apart from
//! snapshots, and downloads of different remote repositories apart from each
//! other.
//!
//! Composers are created once per session by a [`PrefixComposerFactory`]; the
//! factory to use is picked by the component selector from a
//! [`ComponentRegistry`] (see [`registry`]).
//!
//! ## Layout
//!
//! With every split enabled, a release downloaded from `central` lands under
//! `cached/central/releases/...` (or `cached/releases/central/...` when the
//! repository segment is configured to come last), while a locally installed
//! snapshot lands under `installed/snapshots/...`.

use std::fmt;
use std::sync::Arc;

use crate::artifact::{Artifact, LocalRepository, Metadata, RemoteRepository};
use crate::config::{keys, SessionConfig};
use crate::error::Result;
use crate::selector::ComponentRegistry;

/// Produces the optional path prefix of each kind of local repository entry
pub trait PrefixComposer: Send + Sync + fmt::Debug {
    fn prefix_for_local_artifact(&self, artifact: &Artifact) -> Option<String>;

    fn prefix_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
    ) -> Option<String>;

    fn prefix_for_local_metadata(&self, metadata: &Metadata) -> Option<String>;

    fn prefix_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
    ) -> Option<String>;
}

/// Builds the prefix composer of a session
pub trait PrefixComposerFactory: Send + Sync {
    fn create(
        &self,
        config: &SessionConfig,
        repository: &LocalRepository,
    ) -> Result<Box<dyn PrefixComposer>>;
}

/// Composer that never adds a prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPrefixComposer;

impl PrefixComposer for NoopPrefixComposer {
    fn prefix_for_local_artifact(&self, _artifact: &Artifact) -> Option<String> {
        None
    }

    fn prefix_for_remote_artifact(
        &self,
        _artifact: &Artifact,
        _repository: &RemoteRepository,
    ) -> Option<String> {
        None
    }

    fn prefix_for_local_metadata(&self, _metadata: &Metadata) -> Option<String> {
        None
    }

    fn prefix_for_remote_metadata(
        &self,
        _metadata: &Metadata,
        _repository: &RemoteRepository,
    ) -> Option<String> {
        None
    }
}

/// Composer driven by the split flags of the session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPrefixComposer {
    pub split: bool,
    pub local_prefix: String,
    pub split_local: bool,
    pub local_releases_prefix: String,
    pub local_snapshots_prefix: String,
    pub remote_prefix: String,
    pub split_remote: bool,
    pub remote_releases_prefix: String,
    pub remote_snapshots_prefix: String,
    pub split_remote_repository: bool,
    pub split_remote_repository_last: bool,
}

impl Default for SplitPrefixComposer {
    fn default() -> Self {
        Self {
            split: false,
            local_prefix: "installed".to_string(),
            split_local: false,
            local_releases_prefix: "releases".to_string(),
            local_snapshots_prefix: "snapshots".to_string(),
            remote_prefix: "cached".to_string(),
            split_remote: false,
            remote_releases_prefix: "releases".to_string(),
            remote_snapshots_prefix: "snapshots".to_string(),
            split_remote_repository: false,
            split_remote_repository_last: false,
        }
    }
}

impl SplitPrefixComposer {
    /// Reads the split flags and prefix strings from the configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            split: config.get_bool(keys::SPLIT, defaults.split)?,
            local_prefix: config.get_string_or(keys::LOCAL_PREFIX, &defaults.local_prefix),
            split_local: config.get_bool(keys::SPLIT_LOCAL, defaults.split_local)?,
            local_releases_prefix: config
                .get_string_or(keys::LOCAL_RELEASES_PREFIX, &defaults.local_releases_prefix),
            local_snapshots_prefix: config
                .get_string_or(keys::LOCAL_SNAPSHOTS_PREFIX, &defaults.local_snapshots_prefix),
            remote_prefix: config.get_string_or(keys::REMOTE_PREFIX, &defaults.remote_prefix),
            split_remote: config.get_bool(keys::SPLIT_REMOTE, defaults.split_remote)?,
            remote_releases_prefix: config
                .get_string_or(keys::REMOTE_RELEASES_PREFIX, &defaults.remote_releases_prefix),
            remote_snapshots_prefix: config.get_string_or(
                keys::REMOTE_SNAPSHOTS_PREFIX,
                &defaults.remote_snapshots_prefix,
            ),
            split_remote_repository: config
                .get_bool(keys::SPLIT_REMOTE_REPOSITORY, defaults.split_remote_repository)?,
            split_remote_repository_last: config.get_bool(
                keys::SPLIT_REMOTE_REPOSITORY_LAST,
                defaults.split_remote_repository_last,
            )?,
        })
    }

    /// True when no flag is set, i.e. the composer behaves like the no-op one.
    pub fn is_noop(&self) -> bool {
        !(self.split
            || self.split_local
            || self.split_remote
            || self.split_remote_repository)
    }

    fn local(&self, snapshot: bool) -> Option<String> {
        let mut segments = Vec::new();
        if self.split {
            segments.push(self.local_prefix.as_str());
        }
        if self.split_local {
            segments.push(if snapshot {
                self.local_snapshots_prefix.as_str()
            } else {
                self.local_releases_prefix.as_str()
            });
        }
        join(segments)
    }

    fn remote(&self, snapshot: bool, repository: &RemoteRepository) -> Option<String> {
        let mut segments = Vec::new();
        if self.split {
            segments.push(self.remote_prefix.as_str());
        }
        if self.split_remote_repository && !self.split_remote_repository_last {
            segments.push(repository.id());
        }
        if self.split_remote {
            segments.push(if snapshot {
                self.remote_snapshots_prefix.as_str()
            } else {
                self.remote_releases_prefix.as_str()
            });
        }
        if self.split_remote_repository && self.split_remote_repository_last {
            segments.push(repository.id());
        }
        join(segments)
    }
}

fn join(segments: Vec<&str>) -> Option<String> {
    let path = segments
        .into_iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

impl PrefixComposer for SplitPrefixComposer {
    fn prefix_for_local_artifact(&self, artifact: &Artifact) -> Option<String> {
        self.local(artifact.is_snapshot())
    }

    fn prefix_for_remote_artifact(
        &self,
        artifact: &Artifact,
        repository: &RemoteRepository,
    ) -> Option<String> {
        self.remote(artifact.is_snapshot(), repository)
    }

    fn prefix_for_local_metadata(&self, metadata: &Metadata) -> Option<String> {
        self.local(metadata.is_snapshot())
    }

    fn prefix_for_remote_metadata(
        &self,
        metadata: &Metadata,
        repository: &RemoteRepository,
    ) -> Option<String> {
        self.remote(metadata.is_snapshot(), repository)
    }
}

/// Factory honouring the split flags; falls back to the no-op composer when
/// none is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrefixComposerFactory;

impl PrefixComposerFactory for DefaultPrefixComposerFactory {
    fn create(
        &self,
        config: &SessionConfig,
        _repository: &LocalRepository,
    ) -> Result<Box<dyn PrefixComposer>> {
        let composer = SplitPrefixComposer::from_config(config)?;
        if composer.is_noop() {
            Ok(Box::new(NoopPrefixComposer))
        } else {
            Ok(Box::new(composer))
        }
    }
}

/// Factory of the no-op composer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPrefixComposerFactory;

impl PrefixComposerFactory for NoopPrefixComposerFactory {
    fn create(
        &self,
        _config: &SessionConfig,
        _repository: &LocalRepository,
    ) -> Result<Box<dyn PrefixComposer>> {
        Ok(Box::new(NoopPrefixComposer))
    }
}

/// Selection namespace of the prefix composer factories.
pub const SELECTION_NAMESPACE: &str = "prefix-composer";

/// The built-in prefix composer factories.
pub fn registry() -> ComponentRegistry<dyn PrefixComposerFactory> {
    let mut registry: ComponentRegistry<dyn PrefixComposerFactory> = ComponentRegistry::new();
    registry.register("default", 10.0, Arc::new(DefaultPrefixComposerFactory));
    registry.register("noop", 0.0, Arc::new(NoopPrefixComposerFactory));
    registry
}
