//! Structured audit results and the presentation seam.

use std::collections::BTreeMap;

use thiserror::Error;

use tether_core::{Hunk, RelPath};

use crate::compare::Divergence;

/// Everything an audit run classified, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditReport {
    pub strict: bool,
    /// On disk and declared.
    pub matched: Vec<RelPath>,
    /// Declared but absent from disk.
    pub missing: Vec<RelPath>,
    /// On disk, undeclared and not in `allowedExtra`.
    pub unexpected: Vec<RelPath>,
    /// On disk, undeclared but listed in `allowedExtra`.
    pub tolerated_extra: Vec<RelPath>,
    pub divergences: Vec<Divergence>,
}

/// A finding that contributes to a failed verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditFailure {
    #[error("missing file: {0}")]
    MissingFile(RelPath),

    #[error("unexpected file: {0}")]
    UnexpectedFile(RelPath),

    #[error("{} differs from its upstream ({} unexpected, {} missing hunks)", .0.file, .0.unexpected.len(), .0.missing.len())]
    Divergence(Divergence),
}

impl AuditReport {
    /// Pass unless a file is missing, a file diverges, or an unexpected
    /// file exists under `strict`.
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
            && self.divergences.is_empty()
            && (self.unexpected.is_empty() || !self.strict)
    }

    /// Findings that fail the run, grouped by category.
    pub fn failures(&self) -> Vec<AuditFailure> {
        let mut failures: Vec<AuditFailure> = self
            .missing
            .iter()
            .cloned()
            .map(AuditFailure::MissingFile)
            .collect();
        if self.strict {
            failures.extend(self.unexpected.iter().cloned().map(AuditFailure::UnexpectedFile));
        }
        failures.extend(self.divergences.iter().cloned().map(AuditFailure::Divergence));
        failures
    }

    /// Unexpected files that only warrant a warning.
    pub fn warnings(&self) -> &[RelPath] {
        if self.strict {
            &[]
        } else {
            &self.unexpected
        }
    }

    /// Observed hunks of every divergent file, keyed by path.
    pub fn found_patches(&self) -> BTreeMap<RelPath, Vec<Hunk>> {
        self.divergences
            .iter()
            .map(|d| (d.file.clone(), d.found.clone()))
            .collect()
    }
}

/// Receives the structured result of an audit run.
pub trait Reporter {
    fn report(&mut self, report: &AuditReport);
}

/// Reporter that keeps every report it receives.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub reports: Vec<AuditReport>,
}

impl Reporter for CollectingReporter {
    fn report(&mut self, report: &AuditReport) {
        self.reports.push(report.clone());
    }
}
