//! Immutable task graph: weighted tasks connected by weighted precedence edges.
//!
//! Task names are interned to dense integer ids on construction so every hot
//! lookup in the search is a direct array index.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use thiserror::Error;

/// Dense task id (insertion order). Also serves as the fixed task index used
/// by the swap-equivalence rule.
pub type TaskId = u32;

/// Errors raised while building or querying a task graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate task: {0}")]
    DuplicateTask(String),
    #[error("Unknown task referenced by dependency: {0}")]
    UnknownTask(String),
    #[error("Task depends on itself: {0}")]
    SelfDependency(String),
    #[error("Duplicate dependency: {parent} -> {child}")]
    DuplicateDependency { parent: String, child: String },
    #[error("Circular dependency detected")]
    CircularDependency,
    #[error("Edge not found: {parent} -> {child}")]
    EdgeNotFound { parent: String, child: String },
    #[error("Total task and communication cost {total} exceeds the time horizon {}", u32::MAX)]
    CostOverflow { total: u64 },
}

/// One end of a dependency edge as seen from the other task.
///
/// In `outgoing(t)` lists `task` is the child; in `incoming(t)` it is the
/// parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub task: TaskId,
    pub comm_cost: u32,
}

/// Directed acyclic task graph.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    names: Vec<String>,
    by_name: FxHashMap<String, TaskId>,
    costs: Vec<u32>,
    outgoing: Vec<Vec<Edge>>,
    incoming: Vec<Vec<Edge>>,
    topo_order: Vec<TaskId>,
}

impl TaskGraph {
    /// Build a graph from `(name, cost)` tasks and `(parent, child, comm_cost)` edges.
    pub fn new<N, P, C>(
        tasks: impl IntoIterator<Item = (N, u32)>,
        edges: impl IntoIterator<Item = (P, C, u32)>,
    ) -> Result<Self, GraphError>
    where
        N: Into<String>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut by_name: FxHashMap<String, TaskId> = FxHashMap::default();
        let mut costs: Vec<u32> = Vec::new();

        for (name, cost) in tasks {
            let name = name.into();
            if by_name.contains_key(&name) {
                return Err(GraphError::DuplicateTask(name));
            }
            by_name.insert(name.clone(), names.len() as TaskId);
            names.push(name);
            costs.push(cost);
        }

        let n = names.len();
        let mut outgoing: Vec<Vec<Edge>> = vec![Vec::new(); n];
        let mut incoming: Vec<Vec<Edge>> = vec![Vec::new(); n];

        for (parent, child, comm_cost) in edges {
            let (parent, child) = (parent.as_ref(), child.as_ref());
            let p = *by_name
                .get(parent)
                .ok_or_else(|| GraphError::UnknownTask(parent.to_string()))?;
            let c = *by_name
                .get(child)
                .ok_or_else(|| GraphError::UnknownTask(child.to_string()))?;
            if p == c {
                return Err(GraphError::SelfDependency(parent.to_string()));
            }
            if outgoing[p as usize].iter().any(|e| e.task == c) {
                return Err(GraphError::DuplicateDependency {
                    parent: parent.to_string(),
                    child: child.to_string(),
                });
            }
            outgoing[p as usize].push(Edge { task: c, comm_cost });
            incoming[c as usize].push(Edge { task: p, comm_cost });
        }

        // Every schedule the search builds finishes within the sum of all task
        // and communication costs, so bounding it keeps `u32` times exact.
        let total = costs.iter().map(|&c| u64::from(c)).sum::<u64>()
            + outgoing
                .iter()
                .flatten()
                .map(|e| u64::from(e.comm_cost))
                .sum::<u64>();
        if total > u64::from(u32::MAX) {
            return Err(GraphError::CostOverflow { total });
        }

        let topo_order = topological_sort(&outgoing, &incoming)?;

        Ok(Self {
            names,
            by_name,
            costs,
            outgoing,
            incoming,
            topo_order,
        })
    }

    /// Number of tasks.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All task ids in insertion order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        0..self.names.len() as TaskId
    }

    #[inline]
    pub fn name(&self, task: TaskId) -> &str {
        &self.names[task as usize]
    }

    /// Processing cost of a task.
    #[inline]
    pub fn cost(&self, task: TaskId) -> u32 {
        self.costs[task as usize]
    }

    pub fn id_of(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    /// Edges to the children of `task`.
    #[inline]
    pub fn outgoing(&self, task: TaskId) -> &[Edge] {
        &self.outgoing[task as usize]
    }

    /// Edges from the parents of `task`.
    #[inline]
    pub fn incoming(&self, task: TaskId) -> &[Edge] {
        &self.incoming[task as usize]
    }

    /// Communication cost of the edge `parent -> child`.
    pub fn edge_weight(&self, parent: TaskId, child: TaskId) -> Result<u32, GraphError> {
        self.outgoing(parent)
            .iter()
            .find(|e| e.task == child)
            .map(|e| e.comm_cost)
            .ok_or_else(|| GraphError::EdgeNotFound {
                parent: self.name(parent).to_string(),
                child: self.name(child).to_string(),
            })
    }

    /// Tasks ordered so that every parent precedes its children.
    pub fn topological_order(&self) -> &[TaskId] {
        &self.topo_order
    }

    /// Sum of all processing costs.
    pub fn total_cost(&self) -> u64 {
        self.costs.iter().map(|&c| u64::from(c)).sum()
    }
}

/// Kahn's algorithm over the dense adjacency lists.
fn topological_sort(
    outgoing: &[Vec<Edge>],
    incoming: &[Vec<Edge>],
) -> Result<Vec<TaskId>, GraphError> {
    let mut in_degree: Vec<usize> = incoming.iter().map(Vec::len).collect();

    let mut queue: VecDeque<TaskId> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(id, _)| id as TaskId)
        .collect();

    let mut order: Vec<TaskId> = Vec::with_capacity(outgoing.len());

    while let Some(task) = queue.pop_front() {
        order.push(task);
        for edge in &outgoing[task as usize] {
            let degree = &mut in_degree[edge.task as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(edge.task);
            }
        }
    }

    if order.len() != outgoing.len() {
        return Err(GraphError::CircularDependency);
    }

    Ok(order)
}
