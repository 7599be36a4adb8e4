//! Route evaluation: cumulative recurrences, hard-constraint checks and the
//! lexicographic objective.

mod constraints;
mod evaluator;
mod objective;

pub use constraints::{check_all, check_capacity, check_partition, check_precedence};
pub use evaluator::RouteEvaluator;
pub use objective::{Objective, ObjectiveTier, ObjectiveWeights};
