//! Fixture graphs and an exhaustive reference solver shared by the test modules.

use crate::graph::TaskGraph;
use crate::schedule::Placement;

/// Seven-task out-tree. Optimal makespans: 40 (1 processor), 28 (2), 22 (4).
pub fn out_tree() -> TaskGraph {
    TaskGraph::new(
        [
            ("0", 5),
            ("1", 6),
            ("2", 5),
            ("3", 6),
            ("4", 4),
            ("5", 7),
            ("6", 7),
        ],
        [
            ("0", "1", 15),
            ("0", "2", 11),
            ("0", "3", 11),
            ("1", "4", 19),
            ("1", "5", 4),
            ("1", "6", 21),
        ],
    )
    .unwrap()
}

/// Seven-task fork/join graph. Optimal makespans: 16 (1), 12 (2), 11 (3 and 4).
pub fn diamond() -> TaskGraph {
    TaskGraph::new(
        [
            ("a", 2),
            ("b", 2),
            ("c", 2),
            ("d", 3),
            ("e", 2),
            ("f", 3),
            ("g", 2),
        ],
        [
            ("a", "b", 1),
            ("a", "c", 3),
            ("a", "d", 1),
            ("b", "e", 3),
            ("b", "g", 4),
            ("c", "f", 1),
            ("d", "f", 1),
            ("e", "g", 2),
            ("f", "g", 2),
        ],
    )
    .unwrap()
}

/// `a -> b -> c` with expensive communication. Optimal makespan 9 on any
/// processor count.
pub fn chain() -> TaskGraph {
    TaskGraph::new(
        [("a", 3), ("b", 2), ("c", 4)],
        [("a", "b", 10), ("b", "c", 10)],
    )
    .unwrap()
}

/// Four independent tasks. Optimal makespans: 14 (1), 7 (2), 5 (3).
pub fn independent() -> TaskGraph {
    TaskGraph::new(
        [("a", 2), ("b", 3), ("c", 4), ("d", 5)],
        Vec::<(&str, &str, u32)>::new(),
    )
    .unwrap()
}

/// Small deterministic generator for random DAG instances.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_below(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

/// Random DAG with up to `max_tasks` tasks; edges only go from lower to
/// higher position, positions are shuffled relative to task ids.
pub fn random_graph(rng: &mut Lcg, max_tasks: u64, allow_zero_cost: bool) -> TaskGraph {
    let n = 1 + rng.next_below(max_tasks) as usize;
    let min_cost = u64::from(!allow_zero_cost);

    let mut ids: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        ids.swap(i, j);
    }

    let tasks: Vec<(String, u32)> = (0..n)
        .map(|i| (format!("t{i}"), (min_cost + rng.next_below(6)) as u32))
        .collect();
    let mut edges: Vec<(String, String, u32)> = Vec::new();
    for child in 0..n {
        for parent in 0..child {
            if rng.next_below(100) < 30 {
                edges.push((
                    format!("t{}", ids[parent]),
                    format!("t{}", ids[child]),
                    rng.next_below(7) as u32,
                ));
            }
        }
    }
    TaskGraph::new(tasks, edges).unwrap()
}

/// Optimal makespan by exhaustive enumeration of every placement order.
pub fn brute_force_makespan(graph: &TaskGraph, processors: u32) -> u32 {
    brute_force_completion(graph, processors, &[])
}

/// Best makespan of any completion of `prefix` (placements in chain order).
pub fn brute_force_completion(graph: &TaskGraph, processors: u32, prefix: &[Placement]) -> u32 {
    fn recurse(
        graph: &TaskGraph,
        processors: u32,
        placed: &mut Vec<Option<(u32, u32)>>,
        processor_free: &mut Vec<u32>,
        used: u32,
        count: usize,
        best: &mut u32,
    ) {
        if count == graph.len() {
            let makespan = placed.iter().flatten().map(|&(_, f)| f).max().unwrap_or(0);
            *best = (*best).min(makespan);
            return;
        }
        for task in graph.task_ids() {
            if placed[task as usize].is_some()
                || graph
                    .incoming(task)
                    .iter()
                    .any(|e| placed[e.task as usize].is_none())
            {
                continue;
            }
            for pid in 0..(used + 1).min(processors) {
                let mut start = processor_free[pid as usize];
                for edge in graph.incoming(task) {
                    if let Some((parent_pid, parent_finish)) = placed[edge.task as usize] {
                        let arrival = if parent_pid == pid {
                            parent_finish
                        } else {
                            parent_finish + edge.comm_cost
                        };
                        start = start.max(arrival);
                    }
                }
                let finish = start + graph.cost(task);
                let previous = processor_free[pid as usize];
                placed[task as usize] = Some((pid, finish));
                processor_free[pid as usize] = finish;
                recurse(
                    graph,
                    processors,
                    placed,
                    processor_free,
                    used.max(pid + 1),
                    count + 1,
                    best,
                );
                processor_free[pid as usize] = previous;
                placed[task as usize] = None;
            }
        }
    }

    if graph.is_empty() {
        return 0;
    }

    let mut placed = vec![None; graph.len()];
    let mut processor_free = vec![0; processors as usize];
    let mut used = 0;
    for p in prefix {
        placed[p.task as usize] = Some((p.processor - 1, p.finish));
        processor_free[p.processor as usize - 1] = p.finish;
        used = used.max(p.processor);
    }

    let mut best = u32::MAX;
    recurse(
        graph,
        processors,
        &mut placed,
        &mut processor_free,
        used,
        prefix.len(),
        &mut best,
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_force_reference_values() {
        assert_eq!(brute_force_makespan(&out_tree(), 2), 28);
        assert_eq!(brute_force_makespan(&diamond(), 2), 12);
        assert_eq!(brute_force_makespan(&chain(), 3), 9);
        assert_eq!(brute_force_makespan(&independent(), 3), 5);
    }
}
