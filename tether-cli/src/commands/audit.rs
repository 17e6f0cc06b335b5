//! `tether <manifest> [--patches]`: audit a vendored tree.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::runtime::Runtime;

use tether_audit::{audit, RawGitFetcher};

use crate::reporter::ConsoleReporter;

/// Run the audit; returns whether it passed.
pub fn run(runtime: &Runtime, manifest_path: &Path, capture_patches: bool) -> Result<bool> {
    let fetcher = Arc::new(RawGitFetcher::new());
    let mut reporter = ConsoleReporter::stdout();

    let (manifest, report) = runtime
        .block_on(audit::run(manifest_path, fetcher, &mut reporter))
        .with_context(|| format!("audit failed for '{}'", manifest_path.display()))?;

    if capture_patches {
        if let Some(path) = audit::write_found_patches(&manifest, &report)
            .context("failed to write found patches")?
        {
            println!(
                "{} found patches written to {}",
                "✎".cyan(),
                path.display()
            );
        }
    }

    Ok(report.passed())
}
