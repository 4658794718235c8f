//! A* with child generation fanned out over a rayon worker pool.
//!
//! Each pop submits one unit of work per move. Workers only read the graph,
//! the popped schedule and its placement table; the `collect` joins them
//! before the coordinating thread touches the frontier or the closed index.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::SearchConfig;
use crate::graph::TaskGraph;

use super::astar::best_first;
use super::expand::{Candidate, Expander};
use super::{Observer, SearchError, SearchOutcome};

/// Multi-threaded A*. Finds the same makespan as [`super::AStarSearch`].
pub struct ParallelAStarSearch<'g, 'o> {
    expander: Expander<'g>,
    config: SearchConfig,
    observer: Option<Observer<'o>>,
    pool: ThreadPool,
}

impl<'g, 'o> ParallelAStarSearch<'g, 'o> {
    pub fn new(graph: &'g TaskGraph, config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("dagsched-worker-{i}"))
            .build()
            .map_err(|e| SearchError::WorkerPool(e.to_string()))?;

        Ok(Self {
            expander: Expander::new(
                graph,
                config.processors,
                config.advanced_heuristic,
                config.equivalence_pruning,
            ),
            config: config.clone(),
            observer: None,
            pool,
        })
    }

    pub fn with_observer(mut self, observer: Option<Observer<'o>>) -> Self {
        self.observer = observer;
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn run(self) -> Result<SearchOutcome, SearchError> {
        let expander = &self.expander;
        let pool = &self.pool;
        best_first(expander, &self.config, self.observer, |parent, cost| {
            let lookup = expander.lookup(parent.map(Arc::as_ref));
            let moves = expander.moves(parent.map(Arc::as_ref));
            pool.install(|| {
                moves
                    .par_iter()
                    .map(|&mv| expander.generate(parent, cost, &lookup, mv))
                    .collect::<Vec<Option<Candidate>>>()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::PartialSchedule;
    use crate::search::AStarSearch;
    use crate::test_graphs::{diamond, out_tree, random_graph, Lcg};
    use crate::validation::validate_schedule;

    fn config(processors: u32, workers: usize) -> SearchConfig {
        SearchConfig {
            processors,
            workers,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_out_tree_regression() {
        let g = out_tree();
        for (processors, expected) in [(1, 40), (2, 28), (4, 22)] {
            let search = ParallelAStarSearch::new(&g, &config(processors, 3)).unwrap();
            assert_eq!(search.workers(), 3);
            let outcome = search.run().unwrap();
            assert_eq!(outcome.makespan(), expected);
            validate_schedule(&g, &outcome.schedule).unwrap();
        }
    }

    #[test]
    fn test_matches_sequential_exactly() {
        // Children are merged in move order, so the search is deterministic
        // and identical to the sequential engine.
        let g = diamond();
        let cfg = config(2, 4);
        let parallel = ParallelAStarSearch::new(&g, &cfg).unwrap().run().unwrap();
        let sequential = AStarSearch::new(&g, &cfg).unwrap().run().unwrap();
        assert_eq!(parallel.schedule, sequential.schedule);
        assert_eq!(parallel.stats, sequential.stats);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let mut rng = Lcg::new(11);
        for _ in 0..10 {
            let g = random_graph(&mut rng, 7, false);
            let one = ParallelAStarSearch::new(&g, &config(2, 1)).unwrap().run().unwrap();
            let four = ParallelAStarSearch::new(&g, &config(2, 4)).unwrap().run().unwrap();
            assert_eq!(one.makespan(), four.makespan());
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        let g = diamond();
        assert!(matches!(
            ParallelAStarSearch::new(&g, &config(2, 0)),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_schedule_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PartialSchedule>();
        assert_send_sync::<Expander<'static>>();
    }
}
