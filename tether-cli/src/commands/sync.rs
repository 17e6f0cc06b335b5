//! `tether <manifest> --sync`: rebuild declared files from upstream.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::runtime::Runtime;

use tether_audit::{sync, RawGitFetcher, SyncOutcome, SyncReport, WriteResult};

/// Run the sync; returns whether every file was rebuilt.
pub fn run(runtime: &Runtime, manifest_path: &Path, dry_run: bool) -> Result<bool> {
    let fetcher = Arc::new(RawGitFetcher::new());
    let report = runtime
        .block_on(sync::run(manifest_path, fetcher, dry_run))
        .with_context(|| format!("sync failed for '{}'", manifest_path.display()))?;

    print_results(&report, dry_run);
    Ok(report.passed())
}

fn print_results(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    let mut written = 0;
    let mut unchanged = 0;
    let mut rejected = 0;
    for outcome in &report.outcomes {
        match outcome {
            SyncOutcome::Synced { file, write } => match write {
                WriteResult::Written { .. } => {
                    written += 1;
                    println!("  {}  {file}", "✎".green());
                }
                WriteResult::WouldWrite { .. } => {
                    written += 1;
                    println!("  {}  {file}", "~".yellow());
                }
                WriteResult::Unchanged { .. } => {
                    unchanged += 1;
                    println!("  {}  {}", "·".bright_black(), file.to_string().bright_black());
                }
            },
            SyncOutcome::Rejected { file, error } => {
                rejected += 1;
                println!("  {}  {file}: {error}", "✗".red());
            }
        }
    }

    if report.outcomes.is_empty() {
        println!("{prefix}✓ nothing to do: the manifest declares no files");
        return;
    }

    let verb = if dry_run { "would write" } else { "written" };
    let summary =
        format!("{prefix}{written} {verb}, {unchanged} unchanged, {rejected} rejected");
    if rejected == 0 {
        println!("{} {summary}", "✓".green().bold());
    } else {
        println!("{} {summary}", "✗".red().bold());
        println!("Rejected files have stale patches or a stale commit pin; re-audit with --patches.");
    }
}
