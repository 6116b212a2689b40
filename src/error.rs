//! # Error Handling
//!
//! This module defines the centralized error type for the `local-repo`
//! library. It uses the `thiserror` library to build a single `Error` enum
//! covering every failure class of the local repository layer.
//!
//! ## Taxonomy
//!
//! - A coordinate that is simply not cached is **not** an error: `find`
//!   reports it as an unavailable result.
//! - **No matching strategy**: the component selector exhausted every
//!   candidate ([`Error::NoMatchingComponent`], or the single candidate's own
//!   error when only one was tried).
//! - **Tracking I/O failure**: a tracking file could not be locked, read or
//!   written ([`Error::TrackingIo`], [`Error::TrackingFormat`]). Exhausted lock
//!   retries surface as [`Error::LockContention`], which
//!   [`Error::is_tracking_failure`] classifies as a tracking failure as well.
//! - **Misconfiguration**: an unusable local repository or configuration value
//!   detected at construction time ([`Error::InvalidRepository`],
//!   [`Error::Config`]).
//!
//! None of these are retried beyond the bounded lock retry of the tracking
//! store, and none are logged and swallowed.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for local repository operations
#[derive(Error, Debug)]
pub enum Error {
    /// A tracking file could not be opened, locked, read or written.
    #[error("Tracking file I/O error for {}: {source}", .path.display())]
    TrackingIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS reported a lock deadlock on every attempt to lock a tracking file.
    #[error("Tracking file I/O error for {}: lock not acquired after {attempts} attempts: {source}", .path.display())]
    LockContention {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// A tracking file exists but its content cannot be parsed.
    #[error("Malformed tracking file {}: {message}", .path.display())]
    TrackingFormat { path: PathBuf, message: String },

    /// The local repository handed to a manager is unusable.
    #[error("Invalid local repository {}: {message}", .path.display())]
    InvalidRepository { path: PathBuf, message: String },

    /// A factory declined to serve a local repository of the given type.
    #[error("{factory} cannot handle local repository {} with type '{content_type}'", .path.display())]
    UnsupportedRepository {
        factory: String,
        path: PathBuf,
        content_type: String,
    },

    /// Every candidate of a component selection was disabled or rejected.
    #[error("{message}{}", format_failures(.failures))]
    NoMatchingComponent {
        kind: String,
        message: String,
        /// Every candidate that was tried, with the error it reported
        failures: Vec<(String, Error)>,
    },

    /// A session configuration value is present but not of the expected type.
    #[error("Configuration error for '{key}': {message}")]
    Config { key: String, message: String },

    /// A coordinate string could not be parsed.
    #[error("Invalid coordinate '{coordinate}': {message}")]
    Coordinate { coordinate: String, message: String },

    /// A session registry operation referred to an unknown or ended session.
    #[error("Session error: {message}")]
    Session { message: String },

    /// One or more on-end handlers failed while a session was torn down.
    #[error("Session {session} ended with {} failed handler(s){}", .errors.len(), format_errors(.errors))]
    SessionEnd { session: u64, errors: Vec<Error> },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Returns true when the error means provenance data could not be
    /// read or persisted.
    pub fn is_tracking_failure(&self) -> bool {
        matches!(
            self,
            Error::TrackingIo { .. } | Error::LockContention { .. } | Error::TrackingFormat { .. }
        )
    }
}

fn format_failures(failures: &[(String, Error)]) -> String {
    failures
        .iter()
        .map(|(name, error)| format!("\n  {}: {}", name, error))
        .collect()
}

fn format_errors(errors: &[Error]) -> String {
    errors.iter().map(|error| format!("\n  {}", error)).collect()
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_tracking_io() {
        let error = Error::TrackingIo {
            path: PathBuf::from("/repo/com/example/_remote.repositories"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let display = format!("{}", error);
        assert!(display.contains("Tracking file I/O error"));
        assert!(display.contains("_remote.repositories"));
        assert!(display.contains("denied"));
        assert!(error.is_tracking_failure());
    }

    #[test]
    fn test_lock_contention_is_tracking_failure() {
        let error = Error::LockContention {
            path: PathBuf::from("/repo/_remote.repositories"),
            attempts: 5,
            source: std::io::Error::new(std::io::ErrorKind::Deadlock, "deadlock"),
        };
        let display = format!("{}", error);
        assert!(display.contains("Tracking file I/O error"));
        assert!(display.contains("5 attempts"));
        assert!(error.is_tracking_failure());
    }

    #[test]
    fn test_error_display_no_matching_component() {
        let error = Error::NoMatchingComponent {
            kind: "local repository manager".to_string(),
            message: "Cannot access /repo with type 'odd' using [enhanced (10), simple (0)]"
                .to_string(),
            failures: vec![
                (
                    "enhanced".to_string(),
                    Error::Session {
                        message: "first".to_string(),
                    },
                ),
                (
                    "simple".to_string(),
                    Error::Session {
                        message: "second".to_string(),
                    },
                ),
            ],
        };
        let display = format!("{}", error);
        assert!(display.contains("Cannot access /repo"));
        assert!(display.contains("enhanced: Session error: first"));
        assert!(display.contains("simple: Session error: second"));
        assert!(!error.is_tracking_failure());
    }

    #[test]
    fn test_error_display_session_end() {
        let error = Error::SessionEnd {
            session: 3,
            errors: vec![Error::Session {
                message: "flush failed".to_string(),
            }],
        };
        let display = format!("{}", error);
        assert!(display.contains("Session 3 ended with 1 failed handler(s)"));
        assert!(display.contains("flush failed"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_config() {
        let error = Error::Config {
            key: "local-repository.enhanced.split".to_string(),
            message: "expected a boolean, got 'maybe'".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("local-repository.enhanced.split"));
        assert!(display.contains("maybe"));
    }
}
