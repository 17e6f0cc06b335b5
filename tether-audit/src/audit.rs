//! Audit orchestration.
//!
//! 1. Load the manifest.
//! 2. Enumerate files under `manifestDir`.
//! 3. Reconcile disk against the declared paths.
//! 4. For every matched file, concurrently: read it, fetch its baseline,
//!    diff local → remote and compare the hunks with the accepted patches.
//! 5. Aggregate into an [`AuditReport`] ordered by enumeration.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_core::{diff::diff, manifest, reconcile, Manifest, ManifestItem, RelPath};

use crate::compare::{compare, Divergence};
use crate::error::{io_err, AuditError};
use crate::fetch::SourceFetcher;
use crate::report::{AuditReport, Reporter};
use crate::walk::list_files;
use crate::writer::atomic_write;

/// Load the manifest at `manifest_path`, audit it and hand the result to
/// `reporter`.
pub async fn run(
    manifest_path: &Path,
    fetcher: Arc<dyn SourceFetcher>,
    reporter: &mut dyn Reporter,
) -> Result<(Manifest, AuditReport), AuditError> {
    let manifest = manifest::load(manifest_path)?;
    let report = audit(&manifest, fetcher).await?;
    reporter.report(&report);
    Ok((manifest, report))
}

/// Audit an already-loaded manifest.
///
/// Fails as a whole on the first I/O or fetch error; classification
/// outcomes (missing, unexpected, divergent) are collected in the report.
pub async fn audit(
    manifest: &Manifest,
    fetcher: Arc<dyn SourceFetcher>,
) -> Result<AuditReport, AuditError> {
    let on_disk = list_files(&manifest.manifest_dir)?;
    let declared = manifest.declared_paths();
    let r = reconcile(&on_disk, &declared);

    let (tolerated_extra, unexpected): (Vec<RelPath>, Vec<RelPath>) = r
        .only_left
        .into_iter()
        .partition(|path| manifest.allowed_extra.contains(path));
    for path in &unexpected {
        if manifest.strict {
            tracing::debug!("unexpected: {path}");
        } else {
            tracing::warn!("unexpected file tolerated in non-strict mode: {path}");
        }
    }

    let mut handles = Vec::with_capacity(r.matched.len());
    for file in &r.matched {
        let Some(item) = manifest.files.get(file) else {
            continue;
        };
        let item = item.clone();
        let local = file.to_fs_path(&manifest.manifest_dir);
        let fetcher = Arc::clone(&fetcher);
        let task_file = file.clone();
        let handle = tokio::task::spawn_blocking(move || {
            check_file(&task_file, &local, &item, fetcher.as_ref())
        });
        handles.push((file.clone(), handle));
    }

    let mut divergences = Vec::new();
    for (file, handle) in handles {
        let outcome = handle.await.map_err(|source| AuditError::Join {
            file: file.to_string(),
            source,
        })??;
        if let Some(divergence) = outcome {
            divergences.push(divergence);
        }
    }

    Ok(AuditReport {
        strict: manifest.strict,
        matched: r.matched,
        missing: r.only_right,
        unexpected,
        tolerated_extra,
        divergences,
    })
}

fn check_file(
    file: &RelPath,
    local: &Path,
    item: &ManifestItem,
    fetcher: &dyn SourceFetcher,
) -> Result<Option<Divergence>, AuditError> {
    let local_content = std::fs::read_to_string(local).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => AuditError::NotText {
            path: local.to_path_buf(),
        },
        _ => io_err(local, e),
    })?;
    let remote = fetcher
        .fetch(&item.source, file)
        .map_err(|source| AuditError::Fetch {
            file: file.to_string(),
            source,
        })?;
    let found = diff(&local_content, &remote);
    tracing::debug!("{file}: {} hunk(s) found", found.len());
    Ok(compare(file, &found, &item.patches))
}

/// Write the found hunks of every divergent file to the manifest's side
/// file. Returns the path written, or `None` when nothing diverged.
pub fn write_found_patches(
    manifest: &Manifest,
    report: &AuditReport,
) -> Result<Option<PathBuf>, AuditError> {
    if report.divergences.is_empty() {
        return Ok(None);
    }
    let yaml = serde_yaml::to_string(&report.found_patches())?;
    let path = manifest.patches_output_path();
    atomic_write(&path, &yaml, false)?;
    Ok(Some(path))
}
