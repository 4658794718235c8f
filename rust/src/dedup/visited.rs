//! Index of schedules already expanded (or visited), bucketed by structural hash.

use rustc_hash::FxHashMap;

use super::signature::StateSignature;

/// Outcome of looking a schedule up in the [`VisitedIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateVerdict {
    /// No equal state recorded.
    Novel,
    /// An equal state was recorded with a cost no worse than this one.
    Redundant { existing: u32 },
    /// An equal state was recorded with a strictly worse cost.
    Improved { previous: u32 },
}

#[derive(Debug)]
struct VisitedEntry {
    signature: StateSignature,
    cost: u32,
}

/// Best known cost of every recorded state.
#[derive(Debug, Default)]
pub struct VisitedIndex {
    buckets: FxHashMap<u64, Vec<VisitedEntry>>,
    len: usize,
}

impl VisitedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `signature` at `cost` against the recorded states.
    pub fn classify(&self, signature: &StateSignature, cost: u32) -> DuplicateVerdict {
        let found = self
            .buckets
            .get(&signature.hash_value())
            .and_then(|bucket| bucket.iter().find(|e| e.signature == *signature));

        match found {
            None => DuplicateVerdict::Novel,
            Some(entry) if entry.cost <= cost => DuplicateVerdict::Redundant {
                existing: entry.cost,
            },
            Some(entry) => DuplicateVerdict::Improved {
                previous: entry.cost,
            },
        }
    }

    /// Record `signature` at `cost`, keeping the lower cost if it is already
    /// present.
    pub fn record(&mut self, signature: StateSignature, cost: u32) {
        let bucket = self.buckets.entry(signature.hash_value()).or_default();
        match bucket.iter_mut().find(|e| e.signature == signature) {
            Some(entry) => entry.cost = entry.cost.min(cost),
            None => {
                bucket.push(VisitedEntry { signature, cost });
                self.len += 1;
            }
        }
    }

    /// Number of distinct states recorded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
