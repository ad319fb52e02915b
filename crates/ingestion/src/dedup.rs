//! Duplicate elimination keyed by a caller-chosen identity

use std::collections::HashSet;

use contracts::{DedupKey, Recipient};

/// Stateful deduplicator
///
/// The first occurrence of each key wins. State survives across calls to
/// [`Deduplicator::filter`] until [`Deduplicator::reset`].
#[derive(Debug, Default)]
pub struct Deduplicator {
    strategy: DedupKey,
    processed: HashSet<String>,
}

impl Deduplicator {
    pub fn new(strategy: DedupKey) -> Self {
        Self {
            strategy,
            processed: HashSet::new(),
        }
    }

    pub fn strategy(&self) -> DedupKey {
        self.strategy
    }

    /// Change the identity key; already-seen keys are kept as-is
    pub fn set_strategy(&mut self, strategy: DedupKey) {
        self.strategy = strategy;
    }

    /// Drop recipients whose key has been seen, preserving order
    pub fn filter(&mut self, recipients: Vec<Recipient>) -> Vec<Recipient> {
        recipients
            .into_iter()
            .filter(|r| self.processed.insert(r.unique_key(self.strategy)))
            .collect()
    }

    pub fn is_processed(&self, recipient: &Recipient) -> bool {
        self.processed.contains(&recipient.unique_key(self.strategy))
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn reset(&mut self) {
        self.processed.clear();
    }
}
