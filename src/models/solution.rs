//! Assignments read back from an engine and the violations they may carry.

use serde::Serialize;

/// A hard-constraint violation found in an assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViolationType {
    /// A customer is not visited by any route.
    MissingCustomer {
        /// Customer index.
        customer_id: usize,
    },
    /// A customer is visited more than once.
    DuplicateCustomer {
        /// Customer index.
        customer_id: usize,
    },
    /// A sequence refers to a customer outside the instance.
    UnknownCustomer {
        /// Offending index.
        customer_id: usize,
    },
    /// Maximum prefix load of a route exceeds the capacity.
    CapacityExceeded {
        /// Route index in the assignment.
        route_index: usize,
        /// Maximum prefix load.
        load: i32,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Pickup and delivery of a pair are served by different routes.
    PairSplit {
        /// Pickup index.
        pickup: usize,
        /// Delivery index.
        delivery: usize,
    },
    /// Delivery is visited before its pickup.
    PrecedenceBroken {
        /// Route index in the assignment.
        route_index: usize,
        /// Pickup index.
        pickup: usize,
        /// Delivery index.
        delivery: usize,
    },
}

/// A constraint violation in an assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// One customer sequence per vehicle slot, as assigned by an engine.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::Solution;
///
/// let sol = Solution::new(vec![vec![2, 0], vec![], vec![1]]);
/// assert_eq!(sol.num_routes(), 3);
/// assert_eq!(sol.num_used(), 2);
/// assert_eq!(sol.position_of(0), Some((0, 1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Solution {
    routes: Vec<Vec<usize>>,
}

impl Solution {
    /// Creates a solution from per-slot sequences.
    pub fn new(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }

    /// Per-slot sequences, including empty ones.
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// Number of slots.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of slots visiting at least one customer.
    pub fn num_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Total number of visits across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// `(route, position)` of the first visit to `customer_id`.
    pub fn position_of(&self, customer_id: usize) -> Option<(usize, usize)> {
        self.routes.iter().enumerate().find_map(|(r, seq)| {
            seq.iter()
                .position(|&c| c == customer_id)
                .map(|pos| (r, pos))
        })
    }

    /// Consumes the solution, returning the sequences.
    pub fn into_routes(self) -> Vec<Vec<usize>> {
        self.routes
    }
}
