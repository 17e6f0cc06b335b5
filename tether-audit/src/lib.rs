//! # tether-audit
//!
//! Drift audit and patch-based sync for vendored files.
//!
//! Call [`audit::run`] to check a manifest-described tree against its
//! upstream sources, or [`sync::run`] to rebuild every declared file from
//! its upstream baseline plus accepted patches.

pub mod audit;
pub mod compare;
pub mod error;
pub mod fetch;
pub mod report;
pub mod sync;
pub mod walk;
pub mod writer;

pub use compare::{compare, Divergence};
pub use error::{AuditError, FetchError};
pub use fetch::{RawGitFetcher, SourceFetcher};
pub use report::{AuditFailure, AuditReport, Reporter};
pub use sync::{SyncOutcome, SyncReport};
pub use writer::WriteResult;
