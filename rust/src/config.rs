//! Configuration types for the search engines.

use std::fmt;
use std::str::FromStr;

use pyo3::prelude::*;

use crate::search::SearchError;

/// Search strategy selected by [`SearchConfig::algorithm`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    AStar,
    ParallelAStar,
    BranchAndBound,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::AStar => "astar",
            Self::ParallelAStar => "parallel_astar",
            Self::BranchAndBound => "branch_and_bound",
        }
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "astar" => Ok(Self::AStar),
            "parallel_astar" => Ok(Self::ParallelAStar),
            "branch_and_bound" | "bnb" => Ok(Self::BranchAndBound),
            other => Err(SearchError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for algorithm selection and search tuning.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Search algorithm: "astar", "parallel_astar" or "branch_and_bound"
    #[pyo3(get, set)]
    pub algorithm: String,
    /// Number of identical processors to schedule on (>= 1)
    #[pyo3(get, set)]
    pub processors: u32,
    /// Worker threads generating children (parallel_astar only)
    #[pyo3(get, set)]
    pub workers: usize,
    /// Discard schedules whose lower bound exceeds this makespan
    #[pyo3(get, set)]
    pub upper_bound: Option<u32>,
    /// Tighten the upper bound with a greedy list schedule before searching
    #[pyo3(get, set)]
    pub seed_upper_bound: bool,
    /// Prune schedules that a reordering on one processor matches or beats
    #[pyo3(get, set)]
    pub equivalence_pruning: bool,
    /// Use the competing-children bound instead of plain bottom levels
    #[pyo3(get, set)]
    pub advanced_heuristic: bool,
    /// Logging verbosity (0-3)
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: "astar".to_string(),
            processors: 2,
            workers: 4,
            upper_bound: None,
            seed_upper_bound: true,
            equivalence_pruning: false,
            advanced_heuristic: false,
            verbosity: 0,
        }
    }
}

impl SearchConfig {
    /// Default configuration for `processors` processors.
    pub fn with_processors(processors: u32) -> Self {
        Self {
            processors,
            ..Self::default()
        }
    }

    /// Check the numeric fields and resolve the algorithm name.
    pub fn validate(&self) -> Result<Algorithm, SearchError> {
        if self.processors == 0 {
            return Err(SearchError::InvalidConfig(
                "processors must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(SearchError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        self.algorithm.parse()
    }
}

#[pymethods]
impl SearchConfig {
    #[new]
    #[pyo3(signature = (
        algorithm=None,
        processors=None,
        workers=None,
        upper_bound=None,
        seed_upper_bound=None,
        equivalence_pruning=None,
        advanced_heuristic=None,
        verbosity=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        algorithm: Option<String>,
        processors: Option<u32>,
        workers: Option<usize>,
        upper_bound: Option<u32>,
        seed_upper_bound: Option<bool>,
        equivalence_pruning: Option<bool>,
        advanced_heuristic: Option<bool>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            algorithm: algorithm.unwrap_or(defaults.algorithm),
            processors: processors.unwrap_or(defaults.processors),
            workers: workers.unwrap_or(defaults.workers),
            upper_bound,
            seed_upper_bound: seed_upper_bound.unwrap_or(defaults.seed_upper_bound),
            equivalence_pruning: equivalence_pruning.unwrap_or(defaults.equivalence_pruning),
            advanced_heuristic: advanced_heuristic.unwrap_or(defaults.advanced_heuristic),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SearchConfig(algorithm={:?}, processors={}, workers={}, upper_bound={:?})",
            self.algorithm, self.processors, self.workers, self.upper_bound
        )
    }
}
