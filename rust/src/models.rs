//! Core data types exchanged with Python.

use pyo3::prelude::*;
use std::collections::HashMap;

use crate::config::Algorithm;
use crate::graph::{GraphError, TaskGraph};
use crate::schedule::Placement;
use crate::search::SearchOutcome;

// Note: We use std HashMap here for PyO3 interface compatibility

/// A precedence edge; `child` may start once `parent` has finished and, if
/// they run on different processors, `comm_cost` more time has passed.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Dependency {
    #[pyo3(get, set)]
    pub parent: String,
    #[pyo3(get, set)]
    pub child: String,
    #[pyo3(get, set)]
    pub comm_cost: u32,
}

#[pymethods]
impl Dependency {
    #[new]
    #[pyo3(signature = (parent, child, comm_cost=0))]
    fn new(parent: String, child: String, comm_cost: u32) -> Self {
        Self {
            parent,
            child,
            comm_cost,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency(parent={:?}, child={:?}, comm_cost={})",
            self.parent, self.child, self.comm_cost
        )
    }
}

/// A task to be scheduled.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub cost: u32,
}

#[pymethods]
impl Task {
    #[new]
    fn new(id: String, cost: u32) -> Self {
        Self { id, cost }
    }

    fn __repr__(&self) -> String {
        format!("Task(id={:?}, cost={})", self.id, self.cost)
    }
}

/// A task that has been scheduled.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    #[pyo3(get, set)]
    pub task_id: String,
    #[pyo3(get, set)]
    pub processor: u32,
    #[pyo3(get, set)]
    pub start: u32,
    #[pyo3(get, set)]
    pub finish: u32,
}

#[pymethods]
impl ScheduledTask {
    #[new]
    fn new(task_id: String, processor: u32, start: u32, finish: u32) -> Self {
        Self {
            task_id,
            processor,
            start,
            finish,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(task_id={:?}, processor={}, start={}, finish={})",
            self.task_id, self.processor, self.start, self.finish
        )
    }
}

/// Result from a search algorithm.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct AlgorithmResult {
    #[pyo3(get, set)]
    pub scheduled_tasks: Vec<ScheduledTask>,
    #[pyo3(get, set)]
    pub makespan: u32,
    #[pyo3(get, set)]
    pub algorithm_metadata: HashMap<String, String>,
}

#[pymethods]
impl AlgorithmResult {
    #[new]
    #[pyo3(signature = (scheduled_tasks, makespan, algorithm_metadata=None))]
    fn new(
        scheduled_tasks: Vec<ScheduledTask>,
        makespan: u32,
        algorithm_metadata: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            scheduled_tasks,
            makespan,
            algorithm_metadata: algorithm_metadata.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "AlgorithmResult(scheduled_tasks={}, makespan={}, metadata_keys={})",
            self.scheduled_tasks.len(),
            self.makespan,
            self.algorithm_metadata.len()
        )
    }
}

impl AlgorithmResult {
    /// Convert a search outcome, naming tasks as in `graph`.
    pub fn from_outcome(graph: &TaskGraph, outcome: &SearchOutcome, algorithm: Algorithm) -> Self {
        let scheduled_tasks = outcome
            .schedule
            .placements()
            .map(|p| ScheduledTask {
                task_id: graph.name(p.task).to_string(),
                processor: p.processor,
                start: p.start,
                finish: p.finish,
            })
            .collect();

        let stats = &outcome.stats;
        let mut metadata = HashMap::new();
        metadata.insert("algorithm".to_string(), algorithm.name().to_string());
        metadata.insert(
            "processors".to_string(),
            outcome.schedule.processor_count().to_string(),
        );
        metadata.insert("pops".to_string(), stats.pops.to_string());
        metadata.insert("expansions".to_string(), stats.expansions.to_string());
        metadata.insert("generated".to_string(), stats.generated.to_string());
        metadata.insert(
            "duplicates_pruned".to_string(),
            stats.duplicates_pruned.to_string(),
        );
        metadata.insert(
            "equivalence_pruned".to_string(),
            stats.equivalence_pruned.to_string(),
        );
        metadata.insert("bound_pruned".to_string(), stats.bound_pruned.to_string());
        metadata.insert("reopened".to_string(), stats.reopened.to_string());
        metadata.insert(
            "bound_improvements".to_string(),
            stats.bound_improvements.to_string(),
        );
        metadata.insert("peak_frontier".to_string(), stats.peak_frontier.to_string());

        Self {
            scheduled_tasks,
            makespan: outcome.makespan(),
            algorithm_metadata: metadata,
        }
    }
}

/// Build the task graph described by Python-side tasks and dependencies.
pub fn build_graph(tasks: &[Task], dependencies: &[Dependency]) -> Result<TaskGraph, GraphError> {
    TaskGraph::new(
        tasks.iter().map(|t| (t.id.as_str(), t.cost)),
        dependencies
            .iter()
            .map(|d| (d.parent.as_str(), d.child.as_str(), d.comm_cost)),
    )
}

/// Resolve scheduled tasks against `graph`. The reported finish times are
/// kept as given so the validator can check them.
pub fn placements_from_scheduled(
    graph: &TaskGraph,
    scheduled: &[ScheduledTask],
) -> Result<Vec<Placement>, GraphError> {
    scheduled
        .iter()
        .map(|s| {
            let task = graph
                .id_of(&s.task_id)
                .ok_or_else(|| GraphError::UnknownTask(s.task_id.clone()))?;
            Ok(Placement {
                task,
                processor: s.processor,
                start: s.start,
                finish: s.finish,
            })
        })
        .collect()
}
