//! Persistent partial schedules.
//!
//! A [`PartialSchedule`] owns exactly one new placement and an `Arc` to the
//! schedule it extends. Nodes are never mutated after construction, so the
//! many candidate schedules produced by a search share their common prefixes.

use std::sync::Arc;

use crate::graph::{TaskGraph, TaskId};

use super::ready::ReadyTable;

/// Processor id, 1-based.
pub type ProcessorId = u32;

/// One task placed on a processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub task: TaskId,
    pub processor: ProcessorId,
    pub start: u32,
    pub finish: u32,
}

impl Placement {
    pub fn new(graph: &TaskGraph, task: TaskId, processor: ProcessorId, start: u32) -> Self {
        Self {
            task,
            processor,
            start,
            finish: start.saturating_add(graph.cost(task)),
        }
    }
}

/// Last task placed on a processor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessorTail {
    pub task: TaskId,
    pub finish: u32,
}

/// A prefix of task placements linked back to its parent prefix.
#[derive(Debug)]
pub struct PartialSchedule {
    placement: Placement,
    parent: Option<Arc<PartialSchedule>>,
    size: usize,
    max_pid: ProcessorId,
    finish_time: u32,
    unplaced_cost: u64,
    ready: ReadyTable,
    /// Indexed by `processor - 1` for processors `1..=max_pid`.
    tails: Box<[ProcessorTail]>,
}

impl PartialSchedule {
    /// Extend `parent` (or the empty schedule when `None`) with one placement.
    ///
    /// The caller is responsible for `placement` being feasible: the task is
    /// ready and the start time respects the processor and its parents.
    pub fn extend(
        graph: &TaskGraph,
        parent: Option<&Arc<PartialSchedule>>,
        placement: Placement,
    ) -> Self {
        let pid_index = placement.processor as usize - 1;
        let tail = ProcessorTail {
            task: placement.task,
            finish: placement.finish,
        };
        let cost = u64::from(graph.cost(placement.task));

        match parent {
            None => Self {
                placement,
                parent: None,
                size: 1,
                max_pid: placement.processor,
                finish_time: placement.finish,
                unplaced_cost: graph.total_cost() - cost,
                ready: ReadyTable::initial(graph).after_placing(graph, placement.task),
                tails: vec![tail; placement.processor as usize].into_boxed_slice(),
            },
            Some(p) => {
                let max_pid = p.max_pid.max(placement.processor);
                let mut tails = p.tails.to_vec();
                if tails.len() < max_pid as usize {
                    tails.resize(max_pid as usize, tail);
                }
                tails[pid_index] = tail;
                Self {
                    placement,
                    parent: Some(Arc::clone(p)),
                    size: p.size + 1,
                    max_pid,
                    finish_time: p.finish_time.max(placement.finish),
                    unplaced_cost: p.unplaced_cost - cost,
                    ready: p.ready.after_placing(graph, placement.task),
                    tails: tails.into_boxed_slice(),
                }
            }
        }
    }

    /// The placement this node added.
    #[inline]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn parent(&self) -> Option<&Arc<PartialSchedule>> {
        self.parent.as_ref()
    }

    /// Number of tasks placed so far.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Highest processor id used so far.
    #[inline]
    pub fn max_pid(&self) -> ProcessorId {
        self.max_pid
    }

    /// Latest finish time over all placements (the accumulated cost g).
    #[inline]
    pub fn finish_time(&self) -> u32 {
        self.finish_time
    }

    /// Total processing cost of the tasks not placed yet.
    #[inline]
    pub fn unplaced_cost(&self) -> u64 {
        self.unplaced_cost
    }

    pub fn ready(&self) -> &ReadyTable {
        &self.ready
    }

    /// Last placement of every used processor, indexed by `processor - 1`.
    pub fn tails(&self) -> &[ProcessorTail] {
        &self.tails
    }

    /// Finish time of the last task on `processor` (0 for an unused processor).
    pub fn processor_finish(&self, processor: ProcessorId) -> u32 {
        self.tails
            .get(processor as usize - 1)
            .map_or(0, |tail| tail.finish)
    }

    pub fn is_complete(&self, graph: &TaskGraph) -> bool {
        self.size == graph.len()
    }

    /// This node and its ancestors, newest first.
    pub fn iter(&self) -> Ancestors<'_> {
        Ancestors {
            current: Some(self),
        }
    }

    /// Placements on `processor` in the order the chain placed them.
    pub fn processor_sequence(&self, processor: ProcessorId) -> Vec<Placement> {
        let mut sequence: Vec<Placement> = self
            .iter()
            .map(|node| node.placement)
            .filter(|p| p.processor == processor)
            .collect();
        sequence.reverse();
        sequence
    }
}

/// Iterator walking a chain from the newest placement back to the first.
pub struct Ancestors<'a> {
    current: Option<&'a PartialSchedule>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a PartialSchedule;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = node.parent.as_deref();
        Some(node)
    }
}

/// Task-indexed view of every placement in a chain.
///
/// Built once per expanded schedule and shared read-only by every child
/// generated from it.
#[derive(Clone, Debug)]
pub struct PlacementLookup {
    by_task: Vec<Option<Placement>>,
}

impl PlacementLookup {
    pub fn new(graph: &TaskGraph, schedule: Option<&PartialSchedule>) -> Self {
        let mut by_task = vec![None; graph.len()];
        if let Some(schedule) = schedule {
            for node in schedule.iter() {
                by_task[node.placement.task as usize] = Some(node.placement);
            }
        }
        Self { by_task }
    }

    #[inline]
    pub fn get(&self, task: TaskId) -> Option<&Placement> {
        self.by_task[task as usize].as_ref()
    }

    /// Earliest start of `task` on `processor` after `schedule`.
    ///
    /// The later of the processor's last finish and, for every parent, its
    /// finish plus the communication cost when it ran elsewhere. Every parent
    /// must already be placed.
    pub fn earliest_start(
        &self,
        graph: &TaskGraph,
        schedule: Option<&PartialSchedule>,
        task: TaskId,
        processor: ProcessorId,
    ) -> u32 {
        let processor_free = schedule.map_or(0, |s| s.processor_finish(processor));
        graph
            .incoming(task)
            .iter()
            .filter_map(|edge| self.get(edge.task).map(|p| (p, edge.comm_cost)))
            .map(|(parent, comm)| {
                if parent.processor == processor {
                    parent.finish
                } else {
                    parent.finish + comm
                }
            })
            .fold(processor_free, u32::max)
    }
}
