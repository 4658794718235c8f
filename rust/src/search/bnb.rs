//! Depth-first branch-and-bound over partial schedules.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::dedup::{DuplicateVerdict, StateSignature, VisitedIndex};
use crate::graph::TaskGraph;
use crate::schedule::PartialSchedule;
use crate::{log_progress, log_pruning, log_trace};

use super::expand::{Candidate, Expander};
use super::{Observer, SearchError, SearchOutcome, SearchProgress, SearchStats};

/// Branch-and-bound with an explicit stack and a single shrinking upper bound.
pub struct BranchAndBoundSearch<'g, 'o> {
    expander: Expander<'g>,
    config: SearchConfig,
    observer: Option<Observer<'o>>,
}

struct StackEntry {
    cost: u32,
    schedule: Arc<PartialSchedule>,
    signature: StateSignature,
}

impl<'g, 'o> BranchAndBoundSearch<'g, 'o> {
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

    /// Explore until the stack is empty; the last recorded complete schedule
    /// is optimal.
    pub fn run(mut self) -> Result<SearchOutcome, SearchError> {
        let graph = self.expander.graph();
        let verbosity = self.config.verbosity;
        let initial_bound = self.config.upper_bound.unwrap_or(u32::MAX);
        let mut bound = initial_bound;
        let mut stats = SearchStats::default();

        if graph.is_empty() {
            return Ok(SearchOutcome::empty(self.config.processors));
        }

        let mut stack: Vec<StackEntry> = Vec::new();
        let mut visited = VisitedIndex::new();
        let mut best: Option<Arc<PartialSchedule>> = None;

        let roots = self.expander.expand(None, 0);
        push_children(&mut stack, roots, bound, &visited, &mut stats);

        while let Some(entry) = stack.pop() {
            stats.pops += 1;
            log_trace!(
                verbosity,
                "Pop #{}: {} tasks placed, lower bound {}, upper bound {}",
                stats.pops,
                entry.schedule.size(),
                entry.cost,
                bound
            );
            if let Some(observer) = self.observer.as_mut() {
                observer(&SearchProgress {
                    pops: stats.pops,
                    placed: entry.schedule.size(),
                    cost: entry.cost,
                    frontier: stack.len(),
                    upper_bound: Some(bound),
                });
            }

            if entry.cost > bound {
                stats.bound_pruned += 1;
                log_pruning!(
                    verbosity,
                    "  Lower bound {} exceeds upper bound {}",
                    entry.cost,
                    bound
                );
                continue;
            }
            if let DuplicateVerdict::Redundant { existing } =
                visited.classify(&entry.signature, entry.cost)
            {
                stats.duplicates_pruned += 1;
                log_pruning!(
                    verbosity,
                    "  Duplicate state (visited at bound {}, now {})",
                    existing,
                    entry.cost
                );
                continue;
            }
            visited.record(entry.signature, entry.cost);

            if entry.schedule.is_complete(graph) {
                let makespan = entry.schedule.finish_time();
                if makespan <= bound {
                    if makespan < bound {
                        stats.bound_improvements += 1;
                        log_progress!(verbosity, "New best makespan: {}", makespan);
                    }
                    bound = makespan;
                    best = Some(entry.schedule);
                }
                continue;
            }

            stats.expansions += 1;
            let children = self.expander.expand(Some(&entry.schedule), entry.cost);
            push_children(&mut stack, children, bound, &visited, &mut stats);
        }

        match best {
            Some(schedule) => Ok(SearchOutcome::from_partial(
                graph,
                &schedule,
                self.config.processors,
                stats,
            )),
            None => Err(SearchError::NoScheduleWithinBound {
                bound: initial_bound,
            }),
        }
    }
}

/// Filter children against the bound and the visited states, then push them
/// so that the lowest lower bound is popped first.
fn push_children(
    stack: &mut Vec<StackEntry>,
    children: Vec<Option<Candidate>>,
    bound: u32,
    visited: &VisitedIndex,
    stats: &mut SearchStats,
) {
    let mut kept: Vec<StackEntry> = Vec::with_capacity(children.len());
    for candidate in children {
        stats.generated += 1;
        let Some(child) = candidate else {
            stats.equivalence_pruned += 1;
            continue;
        };
        if child.cost > bound {
            stats.bound_pruned += 1;
            continue;
        }
        if matches!(
            visited.classify(&child.signature, child.cost),
            DuplicateVerdict::Redundant { .. }
        ) {
            stats.duplicates_pruned += 1;
            continue;
        }
        kept.push(StackEntry {
            cost: child.cost,
            schedule: child.schedule,
            signature: child.signature,
        });
    }
    kept.sort_by(|a, b| b.cost.cmp(&a.cost));
    stack.extend(kept);
    stats.peak_frontier = stats.peak_frontier.max(stack.len());
}
