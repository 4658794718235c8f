//! Optimal task scheduling on identical processors with communication costs.
//!
//! Tasks form a weighted DAG; placing a child on a different processor than
//! its parent delays it by the edge's communication cost. The searches find a
//! schedule of minimum makespan.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

pub mod bound;
mod config;
pub mod dedup;
pub mod graph;
pub mod heuristic;
pub mod logging;
mod models;
pub mod schedule;
pub mod search;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_graphs;

pub use bound::greedy_schedule;
pub use config::{Algorithm, SearchConfig};
pub use graph::{Edge, GraphError, TaskGraph, TaskId};
pub use heuristic::HeuristicEngine;
pub use models::{
    build_graph, placements_from_scheduled, AlgorithmResult, Dependency, ScheduledTask, Task,
};
pub use schedule::{OutputSchedule, PartialSchedule, Placement, ProcessorId};
pub use search::{
    find_optimal_schedule, find_optimal_schedule_with_observer, SearchError, SearchOutcome,
    SearchProgress, SearchStats,
};
pub use validation::{is_valid, validate_schedule, ScheduleViolation};

fn to_py_err(err: SearchError) -> PyErr {
    match err {
        SearchError::NoScheduleWithinBound { .. } | SearchError::WorkerPool(_) => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Find a minimum-makespan schedule.
///
/// # Arguments
/// * `tasks` - Tasks with their processing costs
/// * `dependencies` - Precedence edges with communication costs
/// * `config` - Search configuration (defaults to A* on 2 processors)
///
/// # Returns
/// * AlgorithmResult with one ScheduledTask per task and search statistics
///
/// # Raises
/// * ValueError for an invalid graph or configuration
/// * RuntimeError if no schedule fits under the configured upper bound
#[pyfunction]
#[pyo3(signature = (tasks, dependencies, config=None))]
fn find_schedule(
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    config: Option<SearchConfig>,
) -> PyResult<AlgorithmResult> {
    let config = config.unwrap_or_default();
    let algorithm = config.validate().map_err(to_py_err)?;
    let graph =
        build_graph(&tasks, &dependencies).map_err(|e| PyValueError::new_err(e.to_string()))?;

    let outcome = find_optimal_schedule(&graph, &config).map_err(to_py_err)?;
    Ok(AlgorithmResult::from_outcome(&graph, &outcome, algorithm))
}

/// Check a schedule against its task graph.
///
/// # Returns
/// * None if the schedule is feasible, otherwise a description of the first
///   violated constraint
///
/// # Raises
/// * ValueError if the graph is invalid or a scheduled task is unknown
#[pyfunction]
#[pyo3(name = "validate_schedule")]
fn py_validate_schedule(
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    scheduled_tasks: Vec<ScheduledTask>,
    processors: u32,
) -> PyResult<Option<String>> {
    let graph =
        build_graph(&tasks, &dependencies).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let placements = placements_from_scheduled(&graph, &scheduled_tasks)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let schedule = OutputSchedule::from_placements(&graph, placements, processors);

    Ok(validate_schedule(&graph, &schedule)
        .err()
        .map(|violation| violation.to_string()))
}

/// Length of the longest cost-weighted path through the graph, a lower bound
/// on every makespan.
#[pyfunction]
fn critical_path_length(tasks: Vec<Task>, dependencies: Vec<Dependency>) -> PyResult<u32> {
    let graph =
        build_graph(&tasks, &dependencies).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(HeuristicEngine::new(&graph, 1, false).critical_path_length())
}

/// The dagsched.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Task>()?;
    m.add_class::<Dependency>()?;
    m.add_class::<ScheduledTask>()?;
    m.add_class::<AlgorithmResult>()?;

    // Config types
    m.add_class::<SearchConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(find_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(critical_path_length, m)?)?;

    Ok(())
}
