//! Feasibility check for finished schedules.

use thiserror::Error;

use crate::graph::TaskGraph;
use crate::schedule::{OutputSchedule, Placement, ProcessorId};

/// First constraint a schedule breaks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleViolation {
    #[error("Task {0} is not scheduled")]
    MissingTask(String),
    #[error("Task {task} is on processor {processor}, outside 1..={processors}")]
    InvalidProcessor {
        task: String,
        processor: ProcessorId,
        processors: u32,
    },
    #[error("Task {task} finishes at {actual}, expected {expected}")]
    FinishMismatch {
        task: String,
        expected: u64,
        actual: u32,
    },
    #[error("Tasks {first} and {second} overlap on processor {processor}")]
    Overlap {
        first: String,
        second: String,
        processor: ProcessorId,
    },
    #[error("Task {child} starts at {actual} but data from {parent} arrives at {required}")]
    PrecedenceViolated {
        parent: String,
        child: String,
        required: u64,
        actual: u32,
    },
    #[error("Reported makespan {reported} differs from latest finish {actual}")]
    MakespanMismatch { reported: u32, actual: u32 },
}

/// Check that `schedule` places every task of `graph` feasibly.
pub fn validate_schedule(
    graph: &TaskGraph,
    schedule: &OutputSchedule,
) -> Result<(), ScheduleViolation> {
    for task in graph.task_ids() {
        let placement = schedule
            .placement(task)
            .ok_or_else(|| ScheduleViolation::MissingTask(graph.name(task).to_string()))?;

        if placement.processor == 0 || placement.processor > schedule.processor_count() {
            return Err(ScheduleViolation::InvalidProcessor {
                task: graph.name(task).to_string(),
                processor: placement.processor,
                processors: schedule.processor_count(),
            });
        }

        // Widened so that start times near `u32::MAX` are reported, not wrapped.
        let expected = u64::from(placement.start) + u64::from(graph.cost(task));
        if u64::from(placement.finish) != expected {
            return Err(ScheduleViolation::FinishMismatch {
                task: graph.name(task).to_string(),
                expected,
                actual: placement.finish,
            });
        }
    }

    // Zero-length tasks occupy no time and are skipped.
    for processor in 1..=schedule.processor_count() {
        let mut previous: Option<&Placement> = None;
        for &task in schedule.tasks_on(processor) {
            let Some(current) = schedule.placement(task) else {
                continue;
            };
            if current.start == current.finish {
                continue;
            }
            if let Some(prev) = previous {
                if prev.finish > current.start {
                    return Err(ScheduleViolation::Overlap {
                        first: graph.name(prev.task).to_string(),
                        second: graph.name(task).to_string(),
                        processor,
                    });
                }
            }
            previous = Some(current);
        }
    }

    for child in graph.task_ids() {
        let Some(child_placement) = schedule.placement(child) else {
            continue;
        };
        for edge in graph.incoming(child) {
            let Some(parent) = schedule.placement(edge.task) else {
                continue;
            };
            let required = if parent.processor == child_placement.processor {
                u64::from(parent.finish)
            } else {
                u64::from(parent.finish) + u64::from(edge.comm_cost)
            };
            if u64::from(child_placement.start) < required {
                return Err(ScheduleViolation::PrecedenceViolated {
                    parent: graph.name(edge.task).to_string(),
                    child: graph.name(child).to_string(),
                    required,
                    actual: child_placement.start,
                });
            }
        }
    }

    let actual = schedule.placements().map(|p| p.finish).max().unwrap_or(0);
    if schedule.makespan() != actual {
        return Err(ScheduleViolation::MakespanMismatch {
            reported: schedule.makespan(),
            actual,
        });
    }

    Ok(())
}

pub fn is_valid(graph: &TaskGraph, schedule: &OutputSchedule) -> bool {
    validate_schedule(graph, schedule).is_ok()
}
