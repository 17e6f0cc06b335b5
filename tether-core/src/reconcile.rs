//! Three-way set reconciliation.
//!
//! Used for both "files on disk vs. files in the manifest" and "hunks found
//! vs. hunks accepted". Membership is set-based (duplicates collapse); each
//! output keeps the order in which elements first appear in its input.

use std::collections::HashSet;
use std::hash::Hash;

/// Result of [`reconcile`]: three disjoint, duplicate-free lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<T> {
    /// In both inputs, in `left` order.
    pub matched: Vec<T>,
    /// Only in `left`, in `left` order.
    pub only_left: Vec<T>,
    /// Only in `right`, in `right` order.
    pub only_right: Vec<T>,
}

impl<T> Reconciliation<T> {
    /// `true` when neither side has anything the other lacks.
    pub fn is_balanced(&self) -> bool {
        self.only_left.is_empty() && self.only_right.is_empty()
    }
}

/// Classify the distinct elements of `left` and `right`.
pub fn reconcile<T>(left: &[T], right: &[T]) -> Reconciliation<T>
where
    T: Eq + Hash + Clone,
{
    let left_set: HashSet<&T> = left.iter().collect();
    let right_set: HashSet<&T> = right.iter().collect();

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut only_left = Vec::new();
    for item in left {
        if !seen.insert(item) {
            continue;
        }
        if right_set.contains(item) {
            matched.push(item.clone());
        } else {
            only_left.push(item.clone());
        }
    }

    let mut seen = HashSet::new();
    let only_right = right
        .iter()
        .filter(|item| !left_set.contains(*item) && seen.insert(*item))
        .cloned()
        .collect();

    Reconciliation {
        matched,
        only_left,
        only_right,
    }
}
