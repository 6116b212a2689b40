//! # Local Repository Library
//!
//! This library provides the local artifact cache of a dependency resolver:
//! it decides whether a usable copy of a requested artifact already exists on
//! disk, where a newly fetched copy must be written, and how concurrent
//! resolvers (threads of one process and separate processes) share the cache
//! without corrupting it. It is designed to be used by the `local-repo`
//! command-line tool but can also be embedded in resolvers directly.
//!
//! ## Quick Example
//!
//! ```
//! use local_repo::artifact::{Artifact, LocalRepository, RemoteRepository};
//! use local_repo::config::SessionConfig;
//! use local_repo::manager::{LocalArtifactRegistration, LocalArtifactRequest, LocalRepositoryManager};
//! use local_repo::provider::LocalRepositoryProvider;
//! use local_repo::session::SessionRegistry;
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let repository = LocalRepository::new(temp.path(), "").unwrap();
//! let registry = SessionRegistry::default();
//! let session = registry
//!     .open(SessionConfig::new(), &LocalRepositoryProvider::default(), &repository)
//!     .unwrap();
//!
//! let artifact: Artifact = "com.example:lib:1.0".parse().unwrap();
//! let central = RemoteRepository::new("central", "https://repo.example.org/maven2");
//! let manager = session.manager();
//!
//! // The fetched file is placed by the caller, then registered.
//! let relative = manager.path_for_remote_artifact(&artifact, &central, "");
//! assert_eq!(relative, "com/example/lib/1.0/lib-1.0.jar");
//! let file = manager.resolve(&relative);
//! std::fs::create_dir_all(file.parent().unwrap()).unwrap();
//! std::fs::write(&file, b"jar").unwrap();
//! manager
//!     .add(&LocalArtifactRegistration::remote(
//!         artifact.clone(),
//!         central.clone(),
//!         vec![String::new()],
//!     ))
//!     .unwrap();
//!
//! let request = LocalArtifactRequest::new(artifact).with_repositories(vec![central]);
//! assert!(manager.find(&request).unwrap().available);
//! registry.end(session).unwrap();
//! ```
//!
//! ## Core Concepts
//!
//! - **Coordinates (`artifact`)**: artifacts, metadata, remote and local
//!   repositories.
//! - **Layout (`path`, `prefix`)**: the pure coordinate to path mapping, and
//!   the optional prefixes splitting one repository into installed and cached
//!   branches.
//! - **Provenance (`tracking`)**: one tracking file per cache directory
//!   recording where each file came from, updated under file locks.
//! - **Managers (`manager`, `provider`)**: the `find`/`add` façade, selected
//!   per repository type by the component selector (`selector`).
//! - **Sessions (`session`, `sync`)**: session lifecycle with on-end handlers,
//!   and the process-wide shared/exclusive lock bracketing cache mutations.
//!
//! ## Execution Flow
//!
//! 1.  **Setup**: open a session; the manager and its prefix composer are
//!     selected once from the configuration.
//! 2.  **Find**: compute candidate paths and consult tracking files.
//! 3.  **Fetch**: on a miss the caller downloads the file (outside this crate).
//! 4.  **Add**: record the provenance of the downloaded file.
//!
//! Steps 2 to 4 are bracketed by a sync context.

pub mod artifact;
pub mod config;
pub mod defaults;
pub mod error;
pub mod manager;
pub mod path;
pub mod prefix;
pub mod provider;
pub mod selector;
pub mod session;
pub mod sync;
pub mod tracking;

#[cfg(test)]
mod path_proptest;
