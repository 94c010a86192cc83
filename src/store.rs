//! Order-preserving deduplication store.
//!
//! Every expansion re-serves all previously seen reviews plus the new ones,
//! so the store sees the same candidates over and over. First-seen wins;
//! later duplicates are dropped silently. Insertion order is the export
//! order.

use std::collections::HashSet;

use crate::record::Review;

/// Accumulating collection of reviews, deduplicated by source `id`.
#[derive(Debug, Default)]
pub struct ReviewStore {
    seen: HashSet<String>,
    records: Vec<Review>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one snapshot's candidates, in document order.
    ///
    /// Candidates whose non-empty `id` was already seen are dropped.
    /// Candidates with an empty `id` are always appended — uniqueness
    /// cannot be verified, and a review is never dropped solely for a
    /// missing identifier.
    ///
    /// Returns the number of previously-unseen non-empty ids admitted.
    /// Empty-id appends are deliberately not counted: they re-appear in
    /// every snapshot and cannot prove forward progress, and the driver
    /// uses this count as its "no new content" stop signal.
    pub fn merge(&mut self, candidates: Vec<Review>) -> usize {
        let mut new_ids = 0;
        for candidate in candidates {
            if candidate.id.is_empty() {
                self.records.push(candidate);
                continue;
            }
            if !self.seen.insert(candidate.id.clone()) {
                continue;
            }
            self.records.push(candidate);
            new_ids += 1;
        }
        new_ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Accumulated records in first-seen order.
    pub fn records(&self) -> &[Review] {
        &self.records
    }

    /// Consume the store, yielding records in first-seen order.
    pub fn into_records(self) -> Vec<Review> {
        self.records
    }
}
