//! Sync orchestration: rebuild declared files from their upstream baseline.
//!
//! Every declared file, present on disk or not, is processed concurrently:
//! fetch the baseline, invert the accepted patches (they run local → remote),
//! apply them to the baseline and write the result atomically. A rejected
//! patch only fails its own file; fetch and I/O errors fail the run.

use std::path::Path;
use std::sync::Arc;

use tether_core::{
    diff::{apply, invert},
    manifest, Manifest, ManifestItem, PatchApplyError, RelPath,
};

use crate::error::AuditError;
use crate::fetch::SourceFetcher;
use crate::writer::{atomic_write, WriteResult};

/// Result for one declared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { file: RelPath, write: WriteResult },
    Rejected { file: RelPath, error: PatchApplyError },
}

/// Outcome of a sync run, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn rejected(&self) -> impl Iterator<Item = (&RelPath, &PatchApplyError)> {
        self.outcomes.iter().filter_map(|o| match o {
            SyncOutcome::Rejected { file, error } => Some((file, error)),
            SyncOutcome::Synced { .. } => None,
        })
    }

    pub fn passed(&self) -> bool {
        self.rejected().next().is_none()
    }
}

/// Load the manifest at `manifest_path` and sync every declared file.
pub async fn run(
    manifest_path: &Path,
    fetcher: Arc<dyn SourceFetcher>,
    dry_run: bool,
) -> Result<SyncReport, AuditError> {
    let manifest = manifest::load(manifest_path)?;
    synchronize(&manifest, fetcher, dry_run).await
}

/// Sync every file declared in `manifest`.
pub async fn synchronize(
    manifest: &Manifest,
    fetcher: Arc<dyn SourceFetcher>,
    dry_run: bool,
) -> Result<SyncReport, AuditError> {
    let mut handles = Vec::with_capacity(manifest.files.len());
    for (file, item) in &manifest.files {
        let item = item.clone();
        let target = file.to_fs_path(&manifest.manifest_dir);
        let fetcher = Arc::clone(&fetcher);
        let task_file = file.clone();
        let handle = tokio::task::spawn_blocking(move || {
            sync_file(task_file, &target, &item, fetcher.as_ref(), dry_run)
        });
        handles.push((file.clone(), handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (file, handle) in handles {
        let outcome = handle.await.map_err(|source| AuditError::Join {
            file: file.to_string(),
            source,
        })??;
        outcomes.push(outcome);
    }
    Ok(SyncReport { outcomes })
}

fn sync_file(
    file: RelPath,
    target: &Path,
    item: &ManifestItem,
    fetcher: &dyn SourceFetcher,
    dry_run: bool,
) -> Result<SyncOutcome, AuditError> {
    let baseline = fetcher
        .fetch(&item.source, &file)
        .map_err(|source| AuditError::Fetch {
            file: file.to_string(),
            source,
        })?;

    let content = match apply(&baseline, &invert(&item.patches)) {
        Ok(content) => content,
        Err(error) => {
            tracing::warn!("{file}: recorded patches do not apply: {error}");
            return Ok(SyncOutcome::Rejected { file, error });
        }
    };

    let write = atomic_write(target, &content, dry_run)?;
    Ok(SyncOutcome::Synced { file, write })
}
