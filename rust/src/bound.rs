//! Greedy list scheduling, used to seed the searches with a feasible upper
//! bound.

use crate::graph::{TaskGraph, TaskId};
use crate::heuristic::HeuristicEngine;
use crate::schedule::{OutputSchedule, Placement, ProcessorId, ReadyTable};

/// Non-optimal schedule built in one pass.
///
/// Repeatedly takes the ready task with the longest remaining path
/// (bottom level plus its own cost, ties to the lowest id) and places it on the
/// processor where it can start first (ties to the lowest id).
pub fn greedy_schedule(graph: &TaskGraph, processors: u32) -> OutputSchedule {
    let processors = processors.max(1);
    let heuristic = HeuristicEngine::new(graph, processors, false);
    let priority = |t: TaskId| heuristic.critical_path_bound(t) + graph.cost(t);

    let mut ready = ReadyTable::initial(graph);
    let mut placed: Vec<Option<Placement>> = vec![None; graph.len()];
    let mut processor_free: Vec<u32> = vec![0; processors as usize];

    for _ in 0..graph.len() {
        let Some(task) = ready
            .ready_tasks()
            .max_by(|&a, &b| priority(a).cmp(&priority(b)).then(b.cmp(&a)))
        else {
            break;
        };

        let placement = (1..=processors)
            .map(|processor| {
                let start = earliest_start(graph, &placed, &processor_free, task, processor);
                Placement::new(graph, task, processor, start)
            })
            .min_by_key(|p| (p.start, p.processor))
            .unwrap_or_else(|| Placement::new(graph, task, 1, 0));

        processor_free[placement.processor as usize - 1] = placement.finish;
        placed[task as usize] = Some(placement);
        ready = ready.after_placing(graph, task);
    }

    OutputSchedule::from_placements(graph, placed.into_iter().flatten(), processors)
}

fn earliest_start(
    graph: &TaskGraph,
    placed: &[Option<Placement>],
    processor_free: &[u32],
    task: TaskId,
    processor: ProcessorId,
) -> u32 {
    graph
        .incoming(task)
        .iter()
        .filter_map(|edge| placed[edge.task as usize].map(|p| (p, edge.comm_cost)))
        .map(|(parent, comm)| {
            if parent.processor == processor {
                parent.finish
            } else {
                parent.finish + comm
            }
        })
        .fold(processor_free[processor as usize - 1], u32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_graphs::{brute_force_makespan, chain, diamond, out_tree, random_graph, Lcg};
    use crate::validation::validate_schedule;

    #[test]
    fn test_greedy_is_valid_upper_bound() {
        for g in [out_tree(), diamond()] {
            for processors in 1..=3 {
                let schedule = greedy_schedule(&g, processors);
                validate_schedule(&g, &schedule).unwrap();
                assert_eq!(schedule.len(), g.len());
                assert!(schedule.makespan() >= brute_force_makespan(&g, processors));
            }
        }
    }

    #[test]
    fn test_chain_sums_costs() {
        let g = chain();
        let schedule = greedy_schedule(&g, 3);
        assert_eq!(schedule.makespan(), 9);
    }

    #[test]
    fn test_single_processor_is_serial() {
        let g = out_tree();
        assert_eq!(greedy_schedule(&g, 1).makespan(), 40);
    }

    #[test]
    fn test_random_graphs_valid() {
        let mut rng = Lcg::new(3);
        for _ in 0..30 {
            let g = random_graph(&mut rng, 8, true);
            let schedule = greedy_schedule(&g, 2);
            validate_schedule(&g, &schedule).unwrap();
        }
    }
}
