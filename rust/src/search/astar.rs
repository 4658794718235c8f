//! Sequential A* over partial schedules.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::dedup::{DuplicateVerdict, StateSignature, VisitedIndex};
use crate::graph::TaskGraph;
use crate::schedule::PartialSchedule;
use crate::{log_progress, log_pruning, log_trace};

use super::expand::{Candidate, Expander};
use super::{Observer, SearchError, SearchOutcome, SearchProgress, SearchStats};

/// Frontier entry ordered so that `BinaryHeap` pops the lowest cost first,
/// then the deepest schedule, then the earliest inserted.
struct OpenEntry {
    cost: u32,
    size: usize,
    seq: u64,
    schedule: Arc<PartialSchedule>,
    signature: StateSignature,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then(self.size.cmp(&other.size))
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search shared by the sequential and parallel engines.
///
/// `children` produces every child of a schedule (`None` for the empty
/// schedule) in move order; it is the only step the parallel engine
/// distributes.
pub(super) fn best_first<F>(
    expander: &Expander<'_>,
    config: &SearchConfig,
    mut observer: Option<Observer<'_>>,
    mut children: F,
) -> Result<SearchOutcome, SearchError>
where
    F: FnMut(Option<&Arc<PartialSchedule>>, u32) -> Vec<Option<Candidate>>,
{
    let graph = expander.graph();
    let verbosity = config.verbosity;
    let bound = config.upper_bound;
    let mut stats = SearchStats::default();

    if graph.is_empty() {
        return Ok(SearchOutcome::empty(config.processors));
    }

    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut closed = VisitedIndex::new();
    let mut seq: u64 = 0;

    let mut push = |open: &mut BinaryHeap<OpenEntry>, candidate: Candidate| {
        open.push(OpenEntry {
            cost: candidate.cost,
            size: candidate.schedule.size(),
            seq,
            schedule: candidate.schedule,
            signature: candidate.signature,
        });
        seq += 1;
    };

    for candidate in children(None, 0) {
        stats.generated += 1;
        match candidate {
            None => stats.equivalence_pruned += 1,
            Some(c) if bound.is_some_and(|b| c.cost > b) => stats.bound_pruned += 1,
            Some(c) => push(&mut open, c),
        }
    }
    stats.peak_frontier = open.len();

    while let Some(entry) = open.pop() {
        stats.pops += 1;
        log_trace!(
            verbosity,
            "Pop #{}: {} tasks placed, cost {}, frontier {}",
            stats.pops,
            entry.size,
            entry.cost,
            open.len()
        );
        if let Some(observer) = observer.as_mut() {
            observer(&SearchProgress {
                pops: stats.pops,
                placed: entry.size,
                cost: entry.cost,
                frontier: open.len(),
                upper_bound: bound,
            });
        }

        match closed.classify(&entry.signature, entry.cost) {
            DuplicateVerdict::Redundant { existing } => {
                stats.duplicates_pruned += 1;
                log_pruning!(
                    verbosity,
                    "  Duplicate state (closed at cost {}, now {})",
                    existing,
                    entry.cost
                );
                continue;
            }
            DuplicateVerdict::Improved { previous } => {
                stats.reopened += 1;
                log_progress!(
                    verbosity,
                    "Heuristic inconsistency: state closed at cost {} reopened at {}",
                    previous,
                    entry.cost
                );
            }
            DuplicateVerdict::Novel => {}
        }
        closed.record(entry.signature, entry.cost);

        if entry.schedule.is_complete(graph) {
            return Ok(SearchOutcome::from_partial(
                graph,
                &entry.schedule,
                config.processors,
                stats,
            ));
        }

        stats.expansions += 1;
        for candidate in children(Some(&entry.schedule), entry.cost) {
            stats.generated += 1;
            let Some(child) = candidate else {
                stats.equivalence_pruned += 1;
                continue;
            };
            if bound.is_some_and(|b| child.cost > b) {
                stats.bound_pruned += 1;
                continue;
            }
            if matches!(
                closed.classify(&child.signature, child.cost),
                DuplicateVerdict::Redundant { .. }
            ) {
                stats.duplicates_pruned += 1;
                continue;
            }
            push(&mut open, child);
        }
        stats.peak_frontier = stats.peak_frontier.max(open.len());
    }

    Err(SearchError::NoScheduleWithinBound {
        bound: bound.unwrap_or(u32::MAX),
    })
}

/// Single-threaded A*.
pub struct AStarSearch<'g, 'o> {
    expander: Expander<'g>,
    config: SearchConfig,
    observer: Option<Observer<'o>>,
}

impl<'g, 'o> AStarSearch<'g, 'o> {
    pub fn new(graph: &'g TaskGraph, config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            expander: Expander::new(
                graph,
                config.processors,
                config.advanced_heuristic,
                config.equivalence_pruning,
            ),
            config: config.clone(),
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Option<Observer<'o>>) -> Self {
        self.observer = observer;
        self
    }

    /// Run to the first complete schedule popped, which is optimal.
    pub fn run(self) -> Result<SearchOutcome, SearchError> {
        let expander = &self.expander;
        best_first(expander, &self.config, self.observer, |parent, cost| {
            expander.expand(parent, cost)
        })
    }
}
