//! Tether: audit vendored files against their upstream sources.
//!
//! # Usage
//!
//! ```text
//! tether <manifest>                 # audit
//! tether <manifest> --patches       # audit, write found hunks to <stem>.patches.yaml
//! tether <manifest> --sync          # rebuild declared files from upstream + patches
//! tether <manifest> --sync --dry-run
//! ```
//!
//! Exits `0` when the audit (or sync) passes and `1` otherwise.

mod commands;
mod reporter;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Detect drift between vendored files and their upstream sources",
    long_about = None,
)]
struct Cli {
    /// Path to the manifest (YAML).
    manifest: PathBuf,

    /// Write the hunks found in divergent files next to the manifest.
    #[arg(long, conflicts_with = "sync")]
    patches: bool,

    /// Rebuild every declared file from its upstream baseline plus recorded patches.
    #[arg(long)]
    sync: bool,

    /// With --sync: show what would be written without writing any files.
    #[arg(long, requires = "sync")]
    dry_run: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let passed = if cli.sync {
        commands::sync::run(&runtime, &cli.manifest, cli.dry_run)?
    } else {
        commands::audit::run(&runtime, &cli.manifest, cli.patches)?
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
