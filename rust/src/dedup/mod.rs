//! Recognising partial schedules that lead to the same set of completions.
//!
//! Two layers:
//! - [`StateSignature`] / [`VisitedIndex`]: exact duplicates, i.e. the same
//!   placements reached in a different order (or on relabelled processors).
//! - [`EquivalenceChecker`]: the swap rule, pruning a schedule when moving its
//!   newest task earlier on its processor gives a schedule that is at least as
//!   good.

mod equivalence;
mod signature;
mod visited;

pub use equivalence::EquivalenceChecker;
pub use signature::StateSignature;
pub use visited::{DuplicateVerdict, VisitedIndex};
