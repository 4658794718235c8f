//! Finished schedules handed to writers and visualisers.

use crate::graph::{TaskGraph, TaskId};

use super::partial::{PartialSchedule, Placement, ProcessorId};

/// A complete assignment of tasks to processors and start times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputSchedule {
    by_task: Vec<Option<Placement>>,
    /// Task ids per processor (index `processor - 1`), ordered by start time.
    by_processor: Vec<Vec<TaskId>>,
    processor_count: u32,
    makespan: u32,
}

impl OutputSchedule {
    /// Schedule with no tasks.
    pub fn empty(processor_count: u32) -> Self {
        Self {
            by_task: Vec::new(),
            by_processor: vec![Vec::new(); processor_count as usize],
            processor_count,
            makespan: 0,
        }
    }

    /// Reinterpret a search chain as an output schedule.
    pub fn from_partial(
        graph: &TaskGraph,
        schedule: &PartialSchedule,
        processor_count: u32,
    ) -> Self {
        let placements = schedule.iter().map(|node| *node.placement());
        Self::from_placements(graph, placements, processor_count)
    }

    /// Build from explicit placements. Tasks may be missing and processors may
    /// fall outside `1..=processor_count`; the validator reports both.
    ///
    /// Out-of-range placements are kept per task but left out of the
    /// per-processor lists.
    pub fn from_placements(
        graph: &TaskGraph,
        placements: impl IntoIterator<Item = Placement>,
        processor_count: u32,
    ) -> Self {
        let mut by_task: Vec<Option<Placement>> = vec![None; graph.len()];
        let mut makespan = 0;

        for placement in placements {
            makespan = makespan.max(placement.finish);
            if let Some(slot) = by_task.get_mut(placement.task as usize) {
                *slot = Some(placement);
            }
        }

        let mut by_processor: Vec<Vec<TaskId>> = vec![Vec::new(); processor_count as usize];
        for placement in by_task.iter().flatten() {
            let slot = placement
                .processor
                .checked_sub(1)
                .and_then(|i| by_processor.get_mut(i as usize));
            if let Some(tasks) = slot {
                tasks.push(placement.task);
            }
        }
        for tasks in &mut by_processor {
            tasks.sort_by_key(|&t| by_task[t as usize].map(|p| (p.start, p.finish)));
        }

        Self {
            by_task,
            by_processor,
            processor_count,
            makespan,
        }
    }

    /// Maximum finish time over all tasks.
    pub fn makespan(&self) -> u32 {
        self.makespan
    }

    pub fn processor_count(&self) -> u32 {
        self.processor_count
    }

    /// Tasks on `processor`, ordered by start time.
    pub fn tasks_on(&self, processor: ProcessorId) -> &[TaskId] {
        processor
            .checked_sub(1)
            .and_then(|i| self.by_processor.get(i as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn placement(&self, task: TaskId) -> Option<&Placement> {
        self.by_task.get(task as usize).and_then(Option::as_ref)
    }

    pub fn processor_of(&self, task: TaskId) -> Option<ProcessorId> {
        self.placement(task).map(|p| p.processor)
    }

    pub fn start_time(&self, task: TaskId) -> Option<u32> {
        self.placement(task).map(|p| p.start)
    }

    pub fn finish_time(&self, task: TaskId) -> Option<u32> {
        self.placement(task).map(|p| p.finish)
    }

    /// All placements in task id order.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.by_task.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.placements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_from_partial_groups_by_processor() {
        let g = TaskGraph::new(
            [("a", 2), ("b", 3), ("c", 4)],
            [("a", "b", 5), ("a", "c", 1)],
        )
        .unwrap();
        let a = Arc::new(PartialSchedule::extend(&g, None, Placement::new(&g, 0, 1, 0)));
        let c = Arc::new(PartialSchedule::extend(&g, Some(&a), Placement::new(&g, 2, 2, 3)));
        let b = PartialSchedule::extend(&g, Some(&c), Placement::new(&g, 1, 1, 2));

        let out = OutputSchedule::from_partial(&g, &b, 3);
        assert_eq!(out.makespan(), 7);
        assert_eq!(out.len(), 3);
        assert_eq!(out.tasks_on(1), &[0, 1]);
        assert_eq!(out.tasks_on(2), &[2]);
        assert!(out.tasks_on(3).is_empty());
        assert!(out.tasks_on(0).is_empty());
        assert_eq!(out.processor_of(2), Some(2));
        assert_eq!(out.start_time(1), Some(2));
        assert_eq!(out.finish_time(1), Some(5));
        assert_eq!(out.processor_count(), 3);
    }

    #[test]
    fn test_out_of_range_processors_kept_per_task_only() {
        let g = TaskGraph::new([("a", 2), ("b", 3)], Vec::<(&str, &str, u32)>::new()).unwrap();
        let stray = Placement {
            task: 1,
            processor: 4_000_000_000,
            start: 0,
            finish: 3,
        };
        let out = OutputSchedule::from_placements(&g, [Placement::new(&g, 0, 1, 0), stray], 2);
        assert_eq!(out.tasks_on(1), &[0]);
        assert!(out.tasks_on(4_000_000_000).is_empty());
        assert_eq!(out.processor_of(1), Some(4_000_000_000));
        assert_eq!(out.makespan(), 3);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_empty() {
        let out = OutputSchedule::empty(2);
        assert_eq!(out.makespan(), 0);
        assert!(out.is_empty());
        assert!(out.tasks_on(2).is_empty());
    }
}
