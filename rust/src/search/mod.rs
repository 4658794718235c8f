//! Optimal schedule search: sequential A*, parallel A* and branch-and-bound.
//!
//! Every engine explores the same tree of partial schedules, produced by the
//! shared [`Expander`]: each step places one ready task on one of the
//! processors `1..=min(max_pid + 1, P)` at its earliest start. Engines differ
//! only in the order they visit that tree.

mod astar;
mod bnb;
mod expand;
mod parallel;

use std::sync::Arc;

use thiserror::Error;

use crate::bound::greedy_schedule;
use crate::config::{Algorithm, SearchConfig};
use crate::graph::{GraphError, TaskGraph};
use crate::log_progress;
use crate::schedule::{OutputSchedule, PartialSchedule};

pub use astar::AStarSearch;
pub use bnb::BranchAndBoundSearch;
pub use expand::{Candidate, Expander, Move};
pub use parallel::ParallelAStarSearch;

/// Errors that can occur during a search.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No schedule with makespan <= {bound} exists")]
    NoScheduleWithinBound { bound: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown search algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Counters collected while searching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Schedules taken off the frontier.
    pub pops: u64,
    /// Schedules whose children were generated.
    pub expansions: u64,
    /// Children generated, pruned or not.
    pub generated: u64,
    /// Schedules dropped because an equal state was already visited.
    pub duplicates_pruned: u64,
    /// Children dropped by the swap rule.
    pub equivalence_pruned: u64,
    /// Schedules dropped because their lower bound exceeded the upper bound.
    pub bound_pruned: u64,
    /// Visited states reached again at a strictly lower cost.
    pub reopened: u64,
    /// Complete schedules that lowered the upper bound.
    pub bound_improvements: u64,
    pub peak_frontier: usize,
}

/// Snapshot handed to the observer after every pop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchProgress {
    pub pops: u64,
    /// Tasks placed by the popped schedule.
    pub placed: usize,
    /// Lower bound of the popped schedule.
    pub cost: u32,
    /// Schedules still waiting on the frontier.
    pub frontier: usize,
    pub upper_bound: Option<u32>,
}

/// Progress callback, invoked on the coordinating thread.
pub type Observer<'a> = Box<dyn FnMut(&SearchProgress) + 'a>;

/// Result of a successful search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub schedule: OutputSchedule,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn makespan(&self) -> u32 {
        self.schedule.makespan()
    }

    fn from_partial(
        graph: &TaskGraph,
        schedule: &Arc<PartialSchedule>,
        processors: u32,
        stats: SearchStats,
    ) -> Self {
        Self {
            schedule: OutputSchedule::from_partial(graph, schedule, processors),
            stats,
        }
    }

    fn empty(processors: u32) -> Self {
        Self {
            schedule: OutputSchedule::empty(processors),
            stats: SearchStats::default(),
        }
    }
}

/// Find a minimum-makespan schedule with the configured algorithm.
pub fn find_optimal_schedule(
    graph: &TaskGraph,
    config: &SearchConfig,
) -> Result<SearchOutcome, SearchError> {
    find_optimal_schedule_with_observer(graph, config, None)
}

/// Like [`find_optimal_schedule`], reporting progress to `observer`.
pub fn find_optimal_schedule_with_observer<'a>(
    graph: &TaskGraph,
    config: &SearchConfig,
    observer: Option<Observer<'a>>,
) -> Result<SearchOutcome, SearchError> {
    let algorithm = config.validate()?;
    let mut config = config.clone();

    if config.seed_upper_bound && !graph.is_empty() {
        let greedy = greedy_schedule(graph, config.processors);
        log_progress!(
            config.verbosity,
            "Greedy schedule makespan: {}",
            greedy.makespan()
        );
        config.upper_bound = Some(
            config
                .upper_bound
                .map_or(greedy.makespan(), |bound| bound.min(greedy.makespan())),
        );
    }

    log_progress!(
        config.verbosity,
        "Searching {} tasks on {} processors with {} (upper bound {:?})",
        graph.len(),
        config.processors,
        algorithm,
        config.upper_bound
    );

    let outcome = match algorithm {
        Algorithm::AStar => AStarSearch::new(graph, &config)?
            .with_observer(observer)
            .run(),
        Algorithm::ParallelAStar => ParallelAStarSearch::new(graph, &config)?
            .with_observer(observer)
            .run(),
        Algorithm::BranchAndBound => BranchAndBoundSearch::new(graph, &config)?
            .with_observer(observer)
            .run(),
    }?;

    log_progress!(
        config.verbosity,
        "Optimal makespan {} after {} pops ({} expanded)",
        outcome.makespan(),
        outcome.stats.pops,
        outcome.stats.expansions
    );
    Ok(outcome)
}
