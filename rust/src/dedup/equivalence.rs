//! Swap equivalence between schedules that differ in the order of tasks on one
//! processor.
//!
//! Tasks carry a fixed index (their [`TaskId`]). When the newest task `m` of a
//! schedule has a lower index than tasks placed before it on the same
//! processor, the schedule that places `m` in front of them was generated too.
//! If moving `m` forward neither finishes the processor later nor delays data
//! for an already placed child on another processor, the current schedule
//! cannot lead to a better completion and is pruned.

use std::iter;

use crate::graph::{TaskGraph, TaskId};
use crate::schedule::{PartialSchedule, Placement, PlacementLookup, ProcessorId};

/// Swap-rule checker for one graph.
#[derive(Clone, Copy, Debug)]
pub struct EquivalenceChecker<'g> {
    graph: &'g TaskGraph,
}

impl<'g> EquivalenceChecker<'g> {
    pub fn new(graph: &'g TaskGraph) -> Self {
        Self { graph }
    }

    /// Whether `schedule` is matched or beaten by a reordering of its newest
    /// placement.
    ///
    /// `lookup` must describe the schedule's parent, i.e. every placement
    /// except the newest one.
    pub fn is_prunable(&self, schedule: &PartialSchedule, lookup: &PlacementLookup) -> bool {
        let newest = *schedule.placement();
        let sequence = schedule.processor_sequence(newest.processor);
        let last = sequence.len() - 1;

        let mut first_moved = last;
        while first_moved > 0 && newest.task < sequence[first_moved - 1].task {
            first_moved -= 1;
            if self.is_parent(sequence[first_moved].task, newest.task) {
                break;
            }
            if self.swap_is_no_worse(&sequence, first_moved, newest, lookup) {
                return true;
            }
        }
        false
    }

    fn is_parent(&self, parent: TaskId, child: TaskId) -> bool {
        self.graph.incoming(child).iter().any(|e| e.task == parent)
    }

    /// Re-place `newest` in front of `sequence[first_moved..last]` as soon as
    /// possible and compare against the current ordering.
    fn swap_is_no_worse(
        &self,
        sequence: &[Placement],
        first_moved: usize,
        newest: Placement,
        lookup: &PlacementLookup,
    ) -> bool {
        let last = sequence.len() - 1;
        let processor = newest.processor;
        let placed = |task: TaskId| {
            if task == newest.task {
                Some(newest)
            } else {
                lookup.get(task).copied()
            }
        };

        let mut free = first_moved
            .checked_sub(1)
            .map_or(0, |prev| sequence[prev].finish);
        let mut reordered: Vec<Placement> = Vec::with_capacity(last - first_moved + 1);
        let tasks = iter::once(newest.task).chain(sequence[first_moved..last].iter().map(|p| p.task));

        for task in tasks {
            let start = self
                .graph
                .incoming(task)
                .iter()
                .filter_map(|edge| {
                    reordered
                        .iter()
                        .find(|p| p.task == edge.task)
                        .copied()
                        .or_else(|| placed(edge.task))
                        .map(|parent| arrival(parent, processor, edge.comm_cost))
                })
                .fold(free, u32::max);
            let placement = Placement::new(self.graph, task, processor, start);
            free = placement.finish;
            reordered.push(placement);
        }

        if free > newest.finish {
            return false;
        }

        // reordered[0] is `newest`, which can only move earlier.
        reordered[1..]
            .iter()
            .zip(&sequence[first_moved..last])
            .filter(|(moved, original)| moved.start > original.start)
            .all(|(moved, _)| self.outgoing_comms_ok(moved, &placed))
    }

    /// A delayed task must not postpone the data it sends to children already
    /// placed on other processors. An unplaced child could be delayed too, so
    /// it fails the check.
    fn outgoing_comms_ok(
        &self,
        moved: &Placement,
        placed: &impl Fn(TaskId) -> Option<Placement>,
    ) -> bool {
        self.graph.outgoing(moved.task).iter().all(|edge| match placed(edge.task) {
            None => false,
            Some(child) if child.processor == moved.processor => true,
            Some(child) => child.start >= moved.finish + edge.comm_cost,
        })
    }
}

fn arrival(parent: Placement, processor: ProcessorId, comm_cost: u32) -> u32 {
    if parent.processor == processor {
        parent.finish
    } else {
        parent.finish + comm_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn check(g: &TaskGraph, schedule: &PartialSchedule) -> bool {
        let lookup = PlacementLookup::new(g, schedule.parent().map(Arc::as_ref));
        EquivalenceChecker::new(g).is_prunable(schedule, &lookup)
    }

    fn independent_pair() -> TaskGraph {
        TaskGraph::new([("a", 2), ("b", 3)], Vec::<(&str, &str, u32)>::new()).unwrap()
    }

    #[test]
    fn test_higher_index_first_is_prunable() {
        let g = independent_pair();
        let b = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 1, 1, 0)));
        let ba = PartialSchedule::extend(&g, Some(&b), Placement::new(&g, 0, 1, 3));
        assert!(check(&g, &ba));
    }

    #[test]
    fn test_index_order_is_kept() {
        let g = independent_pair();
        let a = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 0, 1, 0)));
        let ab = PartialSchedule::extend(&g, Some(&a), Placement::new(&g, 1, 1, 2));
        assert!(!check(&g, &ab));
    }

    #[test]
    fn test_parent_blocks_swap() {
        // y -> x, so x can never move in front of y.
        let g = TaskGraph::new([("x", 2), ("y", 3)], [("y", "x", 4)]).unwrap();
        let y = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 1, 1, 0)));
        let yx = PartialSchedule::extend(&g, Some(&y), Placement::new(&g, 0, 1, 3));
        assert!(!check(&g, &yx));
    }

    #[test]
    fn test_delayed_data_to_placed_child_blocks_swap() {
        // b sends to c on processor 2; moving a in front of b delays that data.
        let g = TaskGraph::new([("a", 2), ("b", 3), ("c", 1)], [("b", "c", 1)]).unwrap();
        let b = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 1, 1, 0)));
        let bc = Arc::new(PartialSchedule::extend(&g, Some(&b), Placement::new(&g, 2, 2, 4)));
        let bca = PartialSchedule::extend(&g, Some(&bc), Placement::new(&g, 0, 1, 3));
        assert!(!check(&g, &bca));
    }

    #[test]
    fn test_unplaced_child_blocks_swap() {
        let g = TaskGraph::new([("a", 2), ("b", 3), ("c", 1)], [("b", "c", 1)]).unwrap();
        let b = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 1, 1, 0)));
        let ba = PartialSchedule::extend(&g, Some(&b), Placement::new(&g, 0, 1, 3));
        assert!(!check(&g, &ba));
    }

    #[test]
    fn test_slack_on_child_allows_swap() {
        // c starts late enough on processor 2 to absorb the delay of b.
        let g = TaskGraph::new([("a", 2), ("b", 3), ("c", 1)], [("b", "c", 1)]).unwrap();
        let b = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 1, 1, 0)));
        let bc = Arc::new(PartialSchedule::extend(&g, Some(&b), Placement::new(&g, 2, 2, 6)));
        let bca = PartialSchedule::extend(&g, Some(&bc), Placement::new(&g, 0, 1, 3));
        assert!(check(&g, &bca));
    }

    #[test]
    fn test_swap_that_finishes_later_is_kept() {
        // a waits for d's data on processor 2, so putting it first delays b.
        let g = TaskGraph::new(
            [("a", 2), ("b", 3), ("d", 1)],
            [("d", "a", 5)],
        )
        .unwrap();
        let d = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 2, 1, 0)));
        let db = Arc::new(PartialSchedule::extend(&g, Some(&d), Placement::new(&g, 1, 2, 0)));
        let dba = PartialSchedule::extend(&g, Some(&db), Placement::new(&g, 0, 2, 6));
        assert_eq!(dba.placement().finish, 8);
        assert!(!check(&g, &dba));
    }
}
