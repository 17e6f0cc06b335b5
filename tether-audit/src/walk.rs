//! Iterative enumeration of the files under the manifest directory.
//!
//! Directories are visited depth-first from an explicit stack, entries are
//! sorted by name within each directory, so the output order is stable.
//! Symlinks to files count as files; symlinked directories are not entered.

use std::path::{Path, PathBuf};

use tether_core::RelPath;

use crate::error::{io_err, AuditError};

/// All regular files under `root`, relative to `root`.
pub fn list_files(root: &Path) -> Result<Vec<RelPath>, AuditError> {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries: Vec<_> = std::fs::read_dir(&dir)
            .map_err(|e| io_err(&dir, e))?
            .collect::<Result<_, _>>()
            .map_err(|e| io_err(&dir, e))?;
        entries.sort_by_key(|e| e.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
            let is_file = if file_type.is_symlink() {
                std::fs::metadata(&path)
                    .map(|m| m.is_file())
                    .unwrap_or(false)
            } else {
                file_type.is_file()
            };

            if file_type.is_dir() {
                subdirs.push(path);
            } else if is_file {
                if let Some(rel) = RelPath::from_fs(root, &path) {
                    tracing::debug!("found: {rel}");
                    files.push(rel);
                }
            }
        }
        // Reverse so the first subdirectory is popped next.
        pending.extend(subdirs.into_iter().rev());
    }
    Ok(files)
}
