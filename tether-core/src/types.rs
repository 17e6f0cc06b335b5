//! Domain types for the Tether manifest.
//!
//! Manifest paths are [`RelPath`] values: normalized, `/`-separated and
//! relative to the manifest directory. Filesystem locations use `PathBuf`.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A normalized path relative to the manifest directory.
///
/// Always `/`-separated, never starts with `/`, and contains no `.` or `..`
/// components. Two spellings of the same file compare equal once wrapped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RelPath(String);

impl RelPath {
    /// Normalize `raw` into a relative manifest path.
    ///
    /// Backslashes are treated as separators, `.` and empty components are
    /// dropped and `..` removes the previous component (never escaping the
    /// root).
    pub fn new(raw: &str) -> Self {
        let mut parts: Vec<&str> = Vec::new();
        for part in raw.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        Self(parts.join("/"))
    }

    /// Like [`RelPath::new`], but `None` when `raw` climbs above the root
    /// or names nothing.
    pub fn checked(raw: &str) -> Option<Self> {
        let mut parts: Vec<&str> = Vec::new();
        for part in raw.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop()?;
                }
                other => parts.push(other),
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    /// Relative path of `path` under `root`, or `None` if it lies outside.
    ///
    /// Both sides are normalized lexically first, so `a/b/..` and `a`
    /// name the same root.
    pub fn from_fs(root: &Path, path: &Path) -> Option<Self> {
        let path = normalize_lexically(path);
        let root = match normalize_lexically(root) {
            dot if dot == Path::new(".") => PathBuf::new(),
            root => root,
        };
        let relative = path.strip_prefix(&root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(Self::new(&parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Absolute location of this path under `root`.
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root; leading `..` of a relative path are
/// kept. An empty result becomes `.`.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RelPath {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for RelPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<RelPath> for String {
    fn from(p: RelPath) -> Self {
        p.0
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// A file pinned to a commit of a git-hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSource {
    /// Scheme-qualified repository address, e.g. `https://github.com/o/r`.
    pub repo: String,
    /// Immutable revision the local copy was taken from.
    pub commit: String,
    /// Path inside the repository. May contain [`FILE_TOKEN`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Placeholder in [`GitSource::path`] replaced with the manifest file path.
pub const FILE_TOKEN: &str = "{file}";

impl GitSource {
    /// The path to request from the repository for manifest entry `file`.
    pub fn resolve_path(&self, file: &RelPath) -> String {
        let resolved = match &self.path {
            Some(template) => template.replace(FILE_TOKEN, file.as_str()),
            None => file.as_str().to_string(),
        };
        resolved.trim_start_matches('/').to_string()
    }
}

/// Where the upstream copy of a file lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Git(GitSource),
}

impl Source {
    /// Manifest key naming this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Git(_) => "git",
        }
    }
}

// ---------------------------------------------------------------------------
// Hunks
// ---------------------------------------------------------------------------

/// Body line appended after a line that has no trailing newline.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// One contiguous changed region between an old and a new text.
///
/// Starts are 1-based. When a side has zero lines its start names the line
/// before which the other side's lines are spliced in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Hunk {
    pub old_start: usize,
    pub old_lines: usize,
    pub new_start: usize,
    pub new_lines: usize,
    /// Body lines prefixed with `+`, `-` or ` `.
    pub lines: Vec<String>,
}

impl Hunk {
    /// Unified-diff style header, e.g. `@@ -3,2 +3,1 @@`.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// One vendored file: where it came from and which local edits are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    pub source: Source,
    /// Accepted delta from the local file (old) to the remote baseline (new).
    pub patches: Vec<Hunk>,
}

/// A loaded, normalized manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Declared files keyed by normalized path.
    pub files: BTreeMap<RelPath, ManifestItem>,
    /// Whether unexpected extra files fail the audit.
    pub strict: bool,
    /// Root the manifest paths are relative to.
    pub manifest_dir: PathBuf,
    /// Paths never reported as unexpected.
    pub allowed_extra: BTreeSet<RelPath>,
    /// Location of the manifest document itself.
    pub manifest_path: PathBuf,
}

impl Manifest {
    /// Declared paths in manifest order.
    pub fn declared_paths(&self) -> Vec<RelPath> {
        self.files.keys().cloned().collect()
    }

    /// Side file receiving captured patches: `<stem>.patches.yaml` next to
    /// the manifest.
    pub fn patches_output_path(&self) -> PathBuf {
        let stem = self
            .manifest_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tether".to_string());
        self.manifest_path
            .with_file_name(format!("{stem}.patches.yaml"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
