//! Error types for tether-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure while reading the manifest.
    #[error("I/O error reading manifest at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest file did not exist at the given path.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A `source` mapping was empty or named more than one provider.
    #[error("invalid source for '{file}': {reason}")]
    InvalidSource { file: String, reason: String },

    /// A `source` named a provider other than `git`.
    #[error("unsupported source '{kind}' for '{file}'; only 'git' is supported")]
    UnsupportedSource { file: String, kind: String },

    /// A declared path is empty or climbs above the manifest directory.
    #[error("invalid path '{file}': must name a file inside the manifest directory")]
    InvalidPath { file: String },

    /// Two manifest keys normalize to the same path.
    #[error("manifest declares '{file}' more than once")]
    DuplicatePath { file: String },
}

/// A hunk sequence could not be applied to a text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchApplyError {
    /// A context or removed line did not match the text at its position.
    #[error("hunk #{hunk}: line {line} expected {expected:?}, found {}", display_found(.found))]
    Mismatch {
        hunk: usize,
        line: usize,
        expected: String,
        found: Option<String>,
    },

    /// A hunk starts before the previous one ended or past the end of the text.
    #[error("hunk #{hunk}: start line {start} is out of range for a {len}-line text")]
    OutOfRange { hunk: usize, start: usize, len: usize },

    /// A hunk body is not a well-formed patch.
    #[error("hunk #{hunk}: {reason}")]
    Malformed { hunk: usize, reason: String },
}

fn display_found(found: &Option<String>) -> String {
    match found {
        Some(line) => format!("{line:?}"),
        None => "end of file".to_string(),
    }
}
