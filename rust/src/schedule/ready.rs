//! Per-schedule table of outstanding predecessor counts.

use crate::graph::{TaskGraph, TaskId};

/// Marker for tasks that are already placed.
const PLACED: u32 = u32::MAX;

/// Remaining-predecessor count for every task not yet placed.
///
/// A count of zero means the task is ready to schedule. The table is a dense
/// array indexed by [`TaskId`]; a child schedule copies its parent's array and
/// only touches the entries of the task it placed and that task's children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyTable {
    pending: Box<[u32]>,
}

impl ReadyTable {
    /// Table for the empty schedule: every task pending on all its parents.
    pub fn initial(graph: &TaskGraph) -> Self {
        let pending = graph
            .task_ids()
            .map(|t| graph.incoming(t).len() as u32)
            .collect();
        Self { pending }
    }

    /// Table after additionally placing `task`.
    pub fn after_placing(&self, graph: &TaskGraph, task: TaskId) -> Self {
        let mut pending = self.pending.clone();
        pending[task as usize] = PLACED;
        for edge in graph.outgoing(task) {
            let count = &mut pending[edge.task as usize];
            if *count != PLACED && *count > 0 {
                *count -= 1;
            }
        }
        Self { pending }
    }

    #[inline]
    #[cfg(test)]
    pub fn is_placed(&self, task: TaskId) -> bool {
        self.pending[task as usize] == PLACED
    }

    #[inline]
    pub fn is_ready(&self, task: TaskId) -> bool {
        self.pending[task as usize] == 0
    }

    /// Outstanding predecessor count, `None` once the task is placed.
    #[cfg(test)]
    pub fn pending(&self, task: TaskId) -> Option<u32> {
        match self.pending[task as usize] {
            PLACED => None,
            count => Some(count),
        }
    }

    /// Ready tasks in ascending id order.
    pub fn ready_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(t, _)| t as TaskId)
    }

    /// Tasks not yet placed, ready or not.
    #[cfg(test)]
    pub fn unplaced(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, &count)| count != PLACED)
            .map(|(t, _)| t as TaskId)
    }
}
