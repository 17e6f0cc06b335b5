//! Hunk-set equivalence between observed drift and accepted patches.

use serde::Serialize;

use tether_core::{reconcile, Hunk, RelPath};

/// A file whose observed hunks differ from its accepted patches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub file: RelPath,
    /// Observed but not accepted.
    pub unexpected: Vec<Hunk>,
    /// Accepted but not observed.
    pub missing: Vec<Hunk>,
    /// Every observed hunk, ready to paste back into the manifest.
    pub found: Vec<Hunk>,
}

/// Compare `found` against `expected` as sets of hunks.
///
/// Hunks are equal when all five fields are equal; order and duplicates are
/// ignored. Returns `None` when both sets are identical.
pub fn compare(file: &RelPath, found: &[Hunk], expected: &[Hunk]) -> Option<Divergence> {
    let r = reconcile(found, expected);
    if r.is_balanced() {
        return None;
    }
    Some(Divergence {
        file: file.clone(),
        unexpected: r.only_left,
        missing: r.only_right,
        found: found.to_vec(),
    })
}
