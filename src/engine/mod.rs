//! Declarative protocol between a routing model and an optimization engine.
//!
//! A model declares sequence variables, constraints over them, the route
//! fold used to derive load/time/lateness/distance from a sequence, and an
//! ordered list of objective tiers. The engine searches, and the model reads
//! the assigned sequences back.
//!
//! - [`Engine`]: the protocol itself
//! - [`ScriptedEngine`]: replays handed-in sequences (tests, solution replay)
//! - [`LocalSearchEngine`]: reference engine: greedy insertion + local search

mod declared;
mod local_search;
mod scripted;

use std::time::Duration;

use serde::Serialize;

use crate::error::{EngineError, ModelError};
use crate::evaluation::ObjectiveTier;
use crate::models::RouteSummary;

pub use declared::{DeclaredModel, RouteScore, Score};
pub use local_search::LocalSearchEngine;
pub use scripted::ScriptedEngine;

/// Handle to an ordered-subset ("list") variable over `0..domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceVar(usize);

impl SequenceVar {
    pub(crate) fn new(id: usize) -> Self {
        Self(id)
    }

    /// Declaration order of this variable.
    pub fn id(&self) -> usize {
        self.0
    }
}

/// A constraint registered with an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The variables jointly contain every domain value exactly once.
    Partition(Vec<SequenceVar>),
    /// The route fold's maximum prefix load of `var` must not exceed `limit`.
    Capacity {
        /// Constrained variable.
        var: SequenceVar,
        /// Load limit.
        limit: i32,
    },
    /// Both values must be in the same variable.
    SameRoute {
        /// Pickup value.
        pickup: usize,
        /// Delivery value.
        delivery: usize,
    },
    /// When both are in the same variable, `pickup` comes first.
    Precedes {
        /// Pickup value.
        pickup: usize,
        /// Delivery value.
        delivery: usize,
    },
}

/// Route fold registered with an engine and invoked once per candidate route.
///
/// Implementations must be pure: the engine may call them from several
/// threads on different sequences.
pub trait CandidateEvaluator: Send + Sync {
    /// Derives the route totals of one sequence.
    fn evaluate_route(&self, sequence: &[usize]) -> Result<RouteSummary, ModelError>;
}

/// Search budget handed to [`Engine::solve`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_routing_model::engine::Budget;
///
/// let budget = Budget::time_limit(Duration::from_secs(20)).with_max_iterations(50_000);
/// assert_eq!(budget.max_iterations(), Some(50_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Budget {
    time_limit: Option<Duration>,
    max_iterations: Option<u64>,
}

impl Budget {
    /// Budget bounded by wall-clock time.
    pub fn time_limit(limit: Duration) -> Self {
        Self {
            time_limit: Some(limit),
            max_iterations: None,
        }
    }

    /// Budget bounded by the number of evaluated moves.
    pub fn iterations(max: u64) -> Self {
        Self {
            time_limit: None,
            max_iterations: Some(max),
        }
    }

    /// Adds an iteration bound.
    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Adds a wall-clock bound.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Wall-clock bound, if any.
    pub fn get_time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Iteration bound, if any.
    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }

    /// Returns `true` if neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.time_limit.is_none() && self.max_iterations.is_none()
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// All hard constraints hold.
    Feasible,
    /// Some hard constraint is still violated.
    Infeasible,
}

/// Summary of a solve returned by [`Engine::solve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    /// Feasibility of the final assignment.
    pub status: SolveStatus,
    /// Score of the final assignment.
    pub score: Score,
    /// Number of evaluated moves.
    pub iterations: u64,
}

/// Black-box optimization engine.
///
/// The declaration calls mirror the modeling API of list-based local search
/// solvers; the engine owns the sequences and mutates them while solving.
pub trait Engine {
    /// Declares a list variable over `0..domain`.
    fn list_var(&mut self, domain: usize) -> SequenceVar;

    /// Registers a hard constraint.
    fn constraint(&mut self, constraint: Constraint) -> Result<(), EngineError>;

    /// Registers the route fold used by capacity constraints and tiers.
    fn evaluator(&mut self, evaluator: std::sync::Arc<dyn CandidateEvaluator>);

    /// Appends a minimization tier; earlier tiers take priority.
    fn minimize(&mut self, tier: ObjectiveTier);

    /// Searches within the budget.
    fn solve(&mut self, budget: &Budget) -> Result<SolveReport, EngineError>;

    /// Reads the sequence assigned to a variable.
    fn sequence_value(&self, var: SequenceVar) -> Result<Vec<usize>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_builders() {
        let b = Budget::iterations(10).with_time_limit(Duration::from_millis(5));
        assert_eq!(b.max_iterations(), Some(10));
        assert_eq!(b.get_time_limit(), Some(Duration::from_millis(5)));
        assert!(!b.is_unbounded());
        assert!(Budget::default().is_unbounded());
    }

    #[test]
    fn test_sequence_var_id() {
        assert_eq!(SequenceVar::new(3).id(), 3);
    }
}
