//! Tether core library: manifest model, set reconciliation, line diffs.
//!
//! - [`types`]: newtypes and manifest structs
//! - [`manifest`]: load / parse
//! - [`reconcile`]: three-way set comparison
//! - [`diff`]: diff / invert / apply hunk sequences
//! - [`error`]: [`ManifestError`], [`PatchApplyError`]

pub mod diff;
pub mod error;
pub mod manifest;
pub mod reconcile;
pub mod types;

pub use error::{ManifestError, PatchApplyError};
pub use reconcile::{reconcile, Reconciliation};
pub use types::{GitSource, Hunk, Manifest, ManifestItem, RelPath, Source};
