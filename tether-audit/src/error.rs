//! Error types for tether-audit.

use std::path::PathBuf;

use thiserror::Error;

use tether_core::ManifestError;

/// Failures of the remote source fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The remote answered 404 for the resolved file.
    #[error("remote file not found: {url}")]
    NotFound { url: String },

    /// Any other HTTP status or transport failure.
    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    /// The repository is not hosted on a supported domain.
    #[error("unsupported repository host: {repo} (only github.com is supported)")]
    UnsupportedDomain { repo: String },
}

/// All errors that abort an audit or sync run.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The manifest could not be loaded.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// A remote baseline could not be fetched.
    #[error("fetch error for '{file}': {source}")]
    Fetch {
        file: String,
        #[source]
        source: FetchError,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A declared local file is not UTF-8 text and cannot be diffed.
    #[error("{path} is not UTF-8 text; only text files can be audited")]
    NotText { path: PathBuf },

    /// A per-file task panicked or was cancelled.
    #[error("task for '{file}' failed: {source}")]
    Join {
        file: String,
        #[source]
        source: tokio::task::JoinError,
    },

    /// YAML serialization error (captured patches).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience constructor for [`AuditError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AuditError {
    AuditError::Io {
        path: path.into(),
        source,
    }
}
