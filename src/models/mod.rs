//! Domain model types for sequence-based routing problems.
//!
//! Provides customers with demands, time windows and pickup/delivery links,
//! the homogeneous fleet, the instance tying them to a distance table,
//! derived route aggregates and assignments read back from an engine.

mod customer;
mod fleet;
mod instance;
mod route;
mod solution;

pub use customer::{Customer, Pairing, TimeWindow};
pub use fleet::Fleet;
pub use instance::{Instance, ProblemKind};
pub use route::{RouteAggregate, RouteSummary, Visit};
pub use solution::{Solution, Violation, ViolationType};
