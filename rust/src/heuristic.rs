//! Admissible lower bounds on the makespan of any completion of a partial schedule.
//!
//! All per-task tables are computed once per graph by dynamic programming, so
//! evaluating a schedule costs O(processors).

use std::collections::VecDeque;

use crate::graph::{TaskGraph, TaskId};
use crate::schedule::PartialSchedule;

/// Precomputed per-task bounds for one graph and processor count.
#[derive(Debug, Clone)]
pub struct HeuristicEngine {
    /// Longest cost-weighted chain of descendants (excluding the task itself).
    bottom_levels: Vec<u32>,
    /// Tighter descendant bound that accounts for competing children.
    advanced: Option<Vec<u32>>,
    critical_path_length: u32,
    processors: u32,
}

impl HeuristicEngine {
    pub fn new(graph: &TaskGraph, processors: u32, use_advanced: bool) -> Self {
        let bottom_levels = compute_bottom_levels(graph);
        let critical_path_length = graph
            .task_ids()
            .map(|t| bottom_levels[t as usize].saturating_add(graph.cost(t)))
            .max()
            .unwrap_or(0);
        let advanced = use_advanced.then(|| compute_advanced_bounds(graph));

        Self {
            bottom_levels,
            advanced,
            critical_path_length,
            processors: processors.max(1),
        }
    }

    /// Time needed after `task` finishes before all its descendants can finish.
    #[inline]
    pub fn critical_path_bound(&self, task: TaskId) -> u32 {
        self.bottom_levels[task as usize]
    }

    /// Competing-children bound for `task`, when enabled.
    pub fn advanced_bound(&self, task: TaskId) -> Option<u32> {
        self.advanced.as_ref().map(|bounds| bounds[task as usize])
    }

    /// Length of the longest path through the graph, counting task costs.
    pub fn critical_path_length(&self) -> u32 {
        self.critical_path_length
    }

    /// Remaining time implied by the descendant chains of each processor's
    /// last task.
    pub fn h(&self, schedule: &PartialSchedule) -> u32 {
        let table = self.advanced.as_deref().unwrap_or(&self.bottom_levels);
        schedule
            .tails()
            .iter()
            .map(|tail| table[tail.task as usize].saturating_add(tail.finish))
            .max()
            .unwrap_or(0)
            .saturating_sub(schedule.finish_time())
    }

    /// Remaining time if all unplaced work were spread perfectly evenly.
    pub fn h1(&self, schedule: &PartialSchedule) -> u32 {
        let busy: u64 = schedule.tails().iter().map(|t| u64::from(t.finish)).sum();
        let total = busy + schedule.unplaced_cost();
        let even = total.div_ceil(u64::from(self.processors));
        u32::try_from(even)
            .unwrap_or(u32::MAX)
            .saturating_sub(schedule.finish_time())
    }

    /// Combined remaining-time estimate.
    pub fn estimate(&self, schedule: &PartialSchedule) -> u32 {
        self.h(schedule).max(self.h1(schedule))
    }

    /// Lower bound on the makespan of every completion of `schedule`.
    ///
    /// `parent_bound` is the bound of the schedule it extends (0 for a root);
    /// taking the maximum keeps bounds monotone along a chain.
    pub fn lower_bound(&self, schedule: &PartialSchedule, parent_bound: u32) -> u32 {
        schedule
            .finish_time()
            .saturating_add(self.estimate(schedule))
            .max(self.critical_path_length)
            .max(parent_bound)
    }
}

/// Bottom levels by DP over reverse topological order.
fn compute_bottom_levels(graph: &TaskGraph) -> Vec<u32> {
    let mut levels = vec![0u32; graph.len()];
    for &task in graph.topological_order().iter().rev() {
        levels[task as usize] = graph
            .outgoing(task)
            .iter()
            .map(|edge| levels[edge.task as usize].saturating_add(graph.cost(edge.task)))
            .max()
            .unwrap_or(0);
    }
    levels
}

/// Advanced bounds, processed sinks-first with the out-degree as a worklist
/// counter.
///
/// For a task `t` with children `C`, one child `c0` may follow `t` directly on
/// its processor. Every other child either runs elsewhere and waits for the
/// communication, or shares the processor and waits for at least `c0`:
///
/// `adv(t) = min over c0 of max(d(c0), max over c != c0 of (min(w(t,c), cost(c0)) + d(c)))`
///
/// with `d(c) = cost(c) + adv(c)`.
fn compute_advanced_bounds(graph: &TaskGraph) -> Vec<u32> {
    let mut bounds = vec![0u32; graph.len()];
    let mut out_degree: Vec<usize> = graph.task_ids().map(|t| graph.outgoing(t).len()).collect();
    let mut worklist: VecDeque<TaskId> = graph
        .task_ids()
        .filter(|&t| out_degree[t as usize] == 0)
        .collect();

    while let Some(task) = worklist.pop_front() {
        bounds[task as usize] = advanced_bound_for(graph, &bounds, task);
        for edge in graph.incoming(task) {
            let degree = &mut out_degree[edge.task as usize];
            *degree -= 1;
            if *degree == 0 {
                worklist.push_back(edge.task);
            }
        }
    }
    bounds
}

fn advanced_bound_for(graph: &TaskGraph, bounds: &[u32], task: TaskId) -> u32 {
    let children = graph.outgoing(task);
    let tail = |c: TaskId| graph.cost(c).saturating_add(bounds[c as usize]);

    children
        .iter()
        .map(|first| {
            let first_cost = graph.cost(first.task);
            children
                .iter()
                .filter(|other| other.task != first.task)
                .map(|other| other.comm_cost.min(first_cost).saturating_add(tail(other.task)))
                .fold(tail(first.task), u32::max)
        })
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Placement;
    use crate::search::Expander;
    use crate::test_graphs::{brute_force_completion, diamond, out_tree, random_graph, Lcg};
    use std::sync::Arc;

    #[test]
    fn test_bottom_levels_out_tree() {
        let g = out_tree();
        let engine = HeuristicEngine::new(&g, 2, false);
        let levels: Vec<u32> = g.task_ids().map(|t| engine.critical_path_bound(t)).collect();
        assert_eq!(levels, vec![13, 7, 0, 0, 0, 0, 0]);
        assert_eq!(engine.critical_path_length(), 18);
        assert_eq!(engine.advanced_bound(0), None);
    }

    #[test]
    fn test_advanced_bounds_dominate_bottom_levels() {
        let g = out_tree();
        let engine = HeuristicEngine::new(&g, 2, true);
        let advanced: Vec<u32> = g.task_ids().map(|t| engine.advanced_bound(t).unwrap()).collect();
        assert_eq!(advanced, vec![17, 11, 0, 0, 0, 0, 0]);

        let g = diamond();
        let engine = HeuristicEngine::new(&g, 2, true);
        for t in g.task_ids() {
            assert!(engine.advanced_bound(t).unwrap() >= engine.critical_path_bound(t));
        }
        assert_eq!(engine.advanced_bound(0), Some(9));
        assert_eq!(engine.critical_path_bound(0), 8);
    }

    #[test]
    fn test_h_and_h1_on_partial_schedule() {
        let g = out_tree();
        let engine = HeuristicEngine::new(&g, 2, false);

        // 0 on p1 [0,5), then 2 on p2 starting at 5 + 11.
        let root = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 0, 1, 0)));
        let child = PartialSchedule::extend(&g, Some(&root), Placement::new(&g, 2, 2, 16));

        assert_eq!(child.finish_time(), 21);
        // Tails: 0 finishes at 5 with 13 to go (18), 2 finishes at 21 with 0.
        assert_eq!(engine.h(&child), 0);
        // (5 + 21 + 30 remaining) / 2 = 28.
        assert_eq!(engine.h1(&child), 7);
        assert_eq!(engine.estimate(&child), 7);
        assert_eq!(engine.lower_bound(&child, 0), 28);
        assert_eq!(engine.lower_bound(&child, 30), 30);

        // Root: 5 + 13 on the descendant chain, (5 + 35) / 2 when balanced.
        assert_eq!(engine.h(&root), 13);
        assert_eq!(engine.h1(&root), 15);
        assert_eq!(engine.lower_bound(&root, 0), 20);
    }

    #[test]
    fn test_bounds_are_admissible() {
        let mut rng = Lcg::new(5);
        for _ in 0..15 {
            let g = random_graph(&mut rng, 5, true);
            let processors = 1 + rng.next_below(3) as u32;
            for advanced in [false, true] {
                let expander = Expander::new(&g, processors, advanced, false);
                let mut frontier: Vec<_> = expander.expand(None, 0).into_iter().flatten().collect();
                for _ in 0..2 {
                    let mut next = Vec::new();
                    for candidate in &frontier {
                        let mut prefix: Vec<Placement> =
                            candidate.schedule.iter().map(|n| *n.placement()).collect();
                        prefix.reverse();
                        let best = brute_force_completion(&g, processors, &prefix);
                        assert!(candidate.cost <= best, "bound {} > optimum {}", candidate.cost, best);
                        next.extend(
                            expander
                                .expand(Some(&candidate.schedule), candidate.cost)
                                .into_iter()
                                .flatten(),
                        );
                    }
                    frontier = next;
                }
            }
        }
    }

    #[test]
    fn test_empty_graph_bounds() {
        let g = TaskGraph::new(
            Vec::<(&str, u32)>::new(),
            Vec::<(&str, &str, u32)>::new(),
        )
        .unwrap();
        let engine = HeuristicEngine::new(&g, 3, true);
        assert_eq!(engine.critical_path_length(), 0);
    }
}
