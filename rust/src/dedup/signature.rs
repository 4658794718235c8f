//! Structural identity of a partial schedule.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::graph::TaskId;
use crate::schedule::PartialSchedule;

/// Canonical form of a partial schedule, independent of placement order.
///
/// Placements are grouped per processor and the groups themselves are
/// sorted, so this is stronger than comparing processor by processor: two
/// schedules that differ only in processor labels get the same signature.
/// Processors are identical, so any completion of one relabels into a
/// completion of the other with the same makespan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSignature {
    hash: u64,
    size: usize,
    max_pid: u32,
    /// Per-processor `(task, start)` lists, each sorted, in sorted order.
    groups: Box<[Box<[(TaskId, u32)]>]>,
}

impl StateSignature {
    pub fn of(schedule: &PartialSchedule) -> Self {
        let mut groups: Vec<Vec<(TaskId, u32)>> = vec![Vec::new(); schedule.max_pid() as usize];
        let mut pairs: Vec<(TaskId, u32)> = Vec::with_capacity(schedule.size());

        for node in schedule.iter() {
            let p = node.placement();
            groups[p.processor as usize - 1].push((p.task, p.start));
            pairs.push((p.task, p.start));
        }

        pairs.sort_unstable();
        let mut hasher = FxHasher::default();
        for (task, start) in &pairs {
            task.hash(&mut hasher);
            start.hash(&mut hasher);
        }
        schedule.size().hash(&mut hasher);

        let mut groups: Vec<Box<[(TaskId, u32)]>> = groups
            .into_iter()
            .map(|mut g| {
                g.sort_unstable();
                g.into_boxed_slice()
            })
            .collect();
        groups.sort_unstable();

        Self {
            hash: hasher.finish(),
            size: schedule.size(),
            max_pid: schedule.max_pid(),
            groups: groups.into_boxed_slice(),
        }
    }

    /// Bucket key for the visited index. Ignores processor labels.
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl Hash for StateSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
