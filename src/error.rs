//! Domain-specific error type for configuration file management.
//!
//! Resolution, coercion, and the file collaborators return the typed
//! [`ConfError`]; resource and command code at the CLI boundary converts it to
//! [`anyhow::Error`] via the standard `?` operator.  Callers that need to
//! branch on a failure (e.g. to recover a missing file) match on the variant
//! before it is converted.
//!
//! # Error kinds
//!
//! ```text
//! ConfError
//! ├── MissingConfiguration / UnresolvedPackage : caller preconditions
//! ├── InvalidPath / InvalidDeclaration          : rejected inputs
//! ├── UnknownPackage / UnknownScope             : parsing
//! ├── NotFound                                  : recoverable by apply
//! └── Parse / Io / Ownership                    : collaborator failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, merging, or materializing a `.conf` file.
#[derive(Error, Debug)]
pub enum ConfError {
    /// `apply` was called without a configuration payload.
    #[error("config is required")]
    MissingConfiguration,

    /// No package identity could be derived from the caller or an installation.
    #[error("package is required")]
    UnresolvedPackage,

    /// The raw relative path cannot be mapped under `etc/`.
    #[error("invalid conf path '{path}': {reason}")]
    InvalidPath {
        /// The path as supplied by the caller.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// The declared configuration contains a value that cannot become text.
    #[error("invalid declared config: {reason}")]
    InvalidDeclaration {
        /// Human-readable description of the offending entry.
        reason: String,
    },

    /// A package name that is neither `splunk` nor `universal_forwarder`.
    #[error("unknown package '{0}': must be one of splunk, universal_forwarder")]
    UnknownPackage(String),

    /// A scope name that is not `default`, `local`, or `none`.
    #[error("unknown scope '{0}': must be one of default, local, none")]
    UnknownScope(String),

    /// The configuration file does not exist.
    #[error("conf file not found: {}", path.display())]
    NotFound {
        /// Path that was read.
        path: PathBuf,
    },

    /// The configuration file exists but is not valid `.conf` syntax.
    #[error("invalid conf syntax in {} at line {line}: {message}", path.display())]
    Parse {
        /// Path of the file being parsed.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// An I/O error occurred while reading, writing, or deleting a file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path of the file being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Ownership of a file could not be read or changed.
    #[error("cannot set ownership of {}: {reason}", path.display())]
    Ownership {
        /// Path whose ownership was being changed.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

impl ConfError {
    /// Build a [`ConfError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
