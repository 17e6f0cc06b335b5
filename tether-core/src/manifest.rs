//! Manifest loading.
//!
//! # Document shape
//!
//! ```yaml
//! strict: false               # optional
//! manifestDir: vendor         # optional, relative to the manifest's directory
//! allowedExtra: [README.md]   # optional
//! files:
//!   lib/x.js:
//!     source:
//!       git: { repo: https://github.com/o/r, commit: abc123, path: src/x.js }
//!     patches: []             # optional
//! ```
//!
//! [`load`] reads and normalizes the document; [`parse`] does the same for
//! an in-memory string and never touches the filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestError;
use crate::types::{normalize_lexically, GitSource, Hunk, Manifest, ManifestItem, RelPath, Source};

// ---------------------------------------------------------------------------
// Raw document
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    files: Option<BTreeMap<String, RawItem>>,
    #[serde(default)]
    strict: bool,
    #[serde(default)]
    manifest_dir: Option<PathBuf>,
    #[serde(default)]
    allowed_extra: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawItem {
    source: serde_yaml::Mapping,
    #[serde(default)]
    patches: Option<Vec<Hunk>>,
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the manifest at `path`.
///
/// Returns `ManifestError::NotFound` if absent, `ManifestError::Parse` (with
/// path + line context) if malformed and `ManifestError::UnsupportedSource`
/// for any provider other than `git`.
pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(ManifestError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    // Relative manifest paths are anchored at the working directory so that
    // a `manifestDir` climbing above the manifest still contains it.
    let absolute = if path.is_relative() {
        std::env::current_dir()
            .map_err(|err| ManifestError::Io {
                path: path.to_path_buf(),
                source: err,
            })?
            .join(path)
    } else {
        path.to_path_buf()
    };
    parse(&contents, &absolute)
}

/// Parse `contents` as if it had been read from `path`.
pub fn parse(contents: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let raw: RawManifest = serde_yaml::from_str(contents).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let manifest_path = match path.file_name() {
        Some(name) => base.join(name),
        None => path.to_path_buf(),
    };
    let manifest_dir = match raw.manifest_dir {
        Some(dir) => normalize_lexically(&base.join(dir)),
        None => normalize_lexically(&base),
    };

    let mut files = BTreeMap::new();
    for (key, item) in raw.files.unwrap_or_default() {
        let rel = checked_path(&key)?;
        let source = parse_source(&key, item.source, path)?;
        let entry = ManifestItem {
            source,
            patches: item.patches.unwrap_or_default(),
        };
        if files.insert(rel.clone(), entry).is_some() {
            return Err(ManifestError::DuplicatePath {
                file: rel.to_string(),
            });
        }
    }

    let mut manifest = Manifest {
        files,
        strict: raw.strict,
        manifest_dir,
        allowed_extra: raw
            .allowed_extra
            .iter()
            .map(|p| checked_path(p))
            .collect::<Result<BTreeSet<_>, _>>()?,
        manifest_path,
    };
    let own = [
        manifest.manifest_path.clone(),
        manifest.patches_output_path(),
    ];
    for path in own {
        if let Some(rel) = RelPath::from_fs(&manifest.manifest_dir, &path) {
            manifest.allowed_extra.insert(rel);
        }
    }
    Ok(manifest)
}

fn checked_path(raw: &str) -> Result<RelPath, ManifestError> {
    RelPath::checked(raw).ok_or_else(|| ManifestError::InvalidPath {
        file: raw.to_string(),
    })
}

fn parse_source(
    file: &str,
    mut mapping: serde_yaml::Mapping,
    path: &Path,
) -> Result<Source, ManifestError> {
    if mapping.len() != 1 {
        return Err(ManifestError::InvalidSource {
            file: file.to_string(),
            reason: format!("expected exactly one provider key, found {}", mapping.len()),
        });
    }
    let Some(key) = mapping.keys().next().cloned() else {
        return Err(ManifestError::InvalidSource {
            file: file.to_string(),
            reason: "empty source".to_string(),
        });
    };
    let Some(kind) = key.as_str().map(str::to_string) else {
        return Err(ManifestError::InvalidSource {
            file: file.to_string(),
            reason: "provider key must be a string".to_string(),
        });
    };
    let value = mapping.remove(&key).unwrap_or(serde_yaml::Value::Null);

    match kind.as_str() {
        "git" => {
            let git: GitSource =
                serde_yaml::from_value(value).map_err(|e| ManifestError::Parse {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            Ok(Source::Git(git))
        }
        _ => Err(ManifestError::UnsupportedSource {
            file: file.to_string(),
            kind,
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
files:
  lib/x.js:
    source:
      git:
        repo: https://github.com/o/r
        commit: abc123
"#;

    #[test]
    fn defaults_apply() {
        let manifest = parse(MINIMAL, Path::new("/v/tether.yaml")).expect("parse");
        assert!(!manifest.strict);
        assert_eq!(manifest.manifest_dir, PathBuf::from("/v"));
        let item = &manifest.files[&RelPath::from("lib/x.js")];
        assert!(item.patches.is_empty());
        assert!(manifest.allowed_extra.contains(&RelPath::from("tether.yaml")));
        assert!(manifest
            .allowed_extra
            .contains(&RelPath::from("tether.patches.yaml")));
    }

    #[test]
    fn relative_manifest_path_still_allows_itself() {
        let manifest = parse(MINIMAL, Path::new("tether.yaml")).expect("parse");
        assert_eq!(manifest.manifest_dir, PathBuf::from("."));
        assert!(manifest.allowed_extra.contains(&RelPath::from("tether.yaml")));
    }

    #[test]
    fn manifest_dir_override_is_relative_to_manifest() {
        let doc = format!("manifestDir: vendor\n{MINIMAL}");
        let manifest = parse(&doc, Path::new("/v/tether.yaml")).expect("parse");
        assert_eq!(manifest.manifest_dir, PathBuf::from("/v/vendor"));
        // Manifest lives outside its manifestDir, so it is not listed.
        assert!(!manifest.allowed_extra.contains(&RelPath::from("tether.yaml")));
    }

    #[test]
    fn manifest_dir_above_the_manifest_still_allows_it() {
        let doc = "strict: true\nmanifestDir: ..\nfiles: {}\n";
        let manifest = parse(doc, Path::new("/x/meta/tether.yaml")).expect("parse");
        assert_eq!(manifest.manifest_dir, PathBuf::from("/x"));
        assert!(manifest
            .allowed_extra
            .contains(&RelPath::from("meta/tether.yaml")));
        assert!(manifest
            .allowed_extra
            .contains(&RelPath::from("meta/tether.patches.yaml")));
    }

    #[test]
    fn keys_escaping_the_manifest_dir_are_rejected() {
        let doc = MINIMAL.replace("lib/x.js", "../secret.js");
        let err = parse(&doc, Path::new("/v/m.yaml")).unwrap_err();
        match err {
            ManifestError::InvalidPath { file } => assert_eq!(file, "../secret.js"),
            other => panic!("unexpected error: {other}"),
        }

        let doc = format!("allowedExtra: [\"../up.txt\"]\n{MINIMAL}");
        let err = parse(&doc, Path::new("/v/m.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidPath { .. }));
    }

    #[test]
    fn keys_are_normalized() {
        let doc = MINIMAL.replace("lib/x.js", "./lib//x.js");
        let manifest = parse(&doc, Path::new("/v/m.yaml")).expect("parse");
        assert!(manifest.files.contains_key(&RelPath::from("lib/x.js")));
    }

    #[test]
    fn duplicate_after_normalization_is_rejected() {
        let doc = r#"
files:
  a/b.js:
    source: { git: { repo: r, commit: c } }
  ./a/b.js:
    source: { git: { repo: r, commit: c } }
"#;
        let err = parse(doc, Path::new("m.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::DuplicatePath { .. }));
    }

    #[test]
    fn unsupported_source_is_rejected() {
        let doc = r#"
files:
  a.js:
    source:
      svn: { url: "svn://x" }
"#;
        let err = parse(doc, Path::new("m.yaml")).unwrap_err();
        match err {
            ManifestError::UnsupportedSource { file, kind } => {
                assert_eq!(file, "a.js");
                assert_eq!(kind, "svn");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_returns_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load(&tmp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tether.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        let manifest = load(&path).expect("load");
        assert_eq!(manifest.manifest_dir, tmp.path());
        assert_eq!(manifest.files.len(), 1);
    }
}
