//! Child generation shared by every search engine.

use std::sync::Arc;

use crate::dedup::{EquivalenceChecker, StateSignature};
use crate::graph::{TaskGraph, TaskId};
use crate::heuristic::HeuristicEngine;
use crate::schedule::{PartialSchedule, Placement, PlacementLookup, ProcessorId, ReadyTable};

/// One candidate placement: a ready task on an allowed processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub task: TaskId,
    pub processor: ProcessorId,
}

/// A generated child schedule with its lower bound and identity.
#[derive(Debug)]
pub struct Candidate {
    pub schedule: Arc<PartialSchedule>,
    pub cost: u32,
    pub signature: StateSignature,
}

/// Enumerates and builds the children of a schedule.
///
/// Immutable once built, so one expander is shared by all worker threads.
#[derive(Debug)]
pub struct Expander<'g> {
    graph: &'g TaskGraph,
    heuristic: HeuristicEngine,
    processors: u32,
    equivalence: Option<EquivalenceChecker<'g>>,
}

impl<'g> Expander<'g> {
    pub fn new(
        graph: &'g TaskGraph,
        processors: u32,
        advanced_heuristic: bool,
        equivalence_pruning: bool,
    ) -> Self {
        Self {
            graph,
            heuristic: HeuristicEngine::new(graph, processors, advanced_heuristic),
            processors,
            equivalence: equivalence_pruning.then(|| EquivalenceChecker::new(graph)),
        }
    }

    pub fn graph(&self) -> &'g TaskGraph {
        self.graph
    }

    /// Ready tasks (ascending id) times processors `1..=min(max_pid + 1, P)`.
    ///
    /// `None` stands for the empty schedule.
    pub fn moves(&self, parent: Option<&PartialSchedule>) -> Vec<Move> {
        let initial;
        let (ready, max_pid) = match parent {
            Some(p) => (p.ready(), p.max_pid()),
            None => {
                initial = ReadyTable::initial(self.graph);
                (&initial, 0)
            }
        };
        let open = (max_pid + 1).min(self.processors);

        ready
            .ready_tasks()
            .flat_map(|task| (1..=open).map(move |processor| Move { task, processor }))
            .collect()
    }

    /// Placement table for the children of `parent`.
    pub fn lookup(&self, parent: Option<&PartialSchedule>) -> PlacementLookup {
        PlacementLookup::new(self.graph, parent)
    }

    /// Build the child for `mv`. Returns `None` when the swap rule makes the
    /// child redundant.
    pub fn generate(
        &self,
        parent: Option<&Arc<PartialSchedule>>,
        parent_cost: u32,
        lookup: &PlacementLookup,
        mv: Move,
    ) -> Option<Candidate> {
        let start = lookup.earliest_start(
            self.graph,
            parent.map(Arc::as_ref),
            mv.task,
            mv.processor,
        );
        let placement = Placement::new(self.graph, mv.task, mv.processor, start);
        let schedule = PartialSchedule::extend(self.graph, parent, placement);

        if let Some(checker) = &self.equivalence {
            if checker.is_prunable(&schedule, lookup) {
                return None;
            }
        }

        let cost = self.heuristic.lower_bound(&schedule, parent_cost);
        let signature = StateSignature::of(&schedule);
        Some(Candidate {
            schedule: Arc::new(schedule),
            cost,
            signature,
        })
    }

    /// Every child of `parent`, in move order. Pruned moves are `None`.
    pub fn expand(
        &self,
        parent: Option<&Arc<PartialSchedule>>,
        parent_cost: u32,
    ) -> Vec<Option<Candidate>> {
        let lookup = self.lookup(parent.map(Arc::as_ref));
        self.moves(parent.map(Arc::as_ref))
            .into_iter()
            .map(|mv| self.generate(parent, parent_cost, &lookup, mv))
            .collect()
    }
}
