//! Routing instance: customers, fleet and the precomputed distance table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Customer, Fleet, Pairing};
use crate::distance::{DistanceMatrix, Rounding};
use crate::error::ModelError;

/// Problem family of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    /// Capacitated VRP (Augerat instances).
    Cvrp,
    /// Capacitated VRP with time windows (Solomon instances).
    Cvrptw,
    /// Pickup and delivery with time windows (Li & Lim instances).
    Pdptw,
}

impl ProblemKind {
    /// Rounding policy of the distance table for this family.
    pub fn rounding(self) -> Rounding {
        match self {
            ProblemKind::Cvrp => Rounding::Nearest,
            ProblemKind::Cvrptw | ProblemKind::Pdptw => Rounding::Exact,
        }
    }

    /// Whether the lateness tier is part of the objective.
    pub fn has_time_windows(self) -> bool {
        !matches!(self, ProblemKind::Cvrp)
    }

    /// Whether customers come in pickup/delivery pairs.
    pub fn has_pairs(self) -> bool {
        matches!(self, ProblemKind::Pdptw)
    }

    /// Decimal precision of the total-distance objective, if rounded.
    pub fn distance_decimals(self) -> Option<u32> {
        match self {
            ProblemKind::Cvrp => None,
            ProblemKind::Cvrptw | ProblemKind::Pdptw => Some(2),
        }
    }
}

/// Static data of a routing instance. Immutable after construction.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::{Customer, Fleet, Instance, ProblemKind};
///
/// let customers = vec![
///     Customer::new(0, 3.0, 4.0, 10),
///     Customer::new(1, 6.0, 8.0, 20),
/// ];
/// let instance = Instance::new(
///     ProblemKind::Cvrp,
///     (0.0, 0.0),
///     customers,
///     Fleet::new(2, 30),
/// ).unwrap();
/// assert_eq!(instance.num_customers(), 2);
/// assert_eq!(instance.distances().depot(0), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    kind: ProblemKind,
    depot: (f64, f64),
    customers: Vec<Customer>,
    fleet: Fleet,
    distances: DistanceMatrix,
}

impl Instance {
    /// Builds an instance, computing the distance table with the family's
    /// rounding policy.
    ///
    /// # Errors
    ///
    /// `InfeasibleStructural` when the fleet is empty or pickup/delivery
    /// links are not mutual. Oversized demands are accepted here; see
    /// [`Instance::check_capacity_fit`].
    /// `MalformedInstance` when customer ids don't match their position.
    pub fn new(
        kind: ProblemKind,
        depot: (f64, f64),
        customers: Vec<Customer>,
        fleet: Fleet,
    ) -> Result<Self, ModelError> {
        let distances = DistanceMatrix::from_customers(depot, &customers, kind.rounding());
        Self::with_distances(kind, depot, customers, fleet, distances)
    }

    /// Builds an instance around an explicit distance table.
    pub fn with_distances(
        kind: ProblemKind,
        depot: (f64, f64),
        customers: Vec<Customer>,
        fleet: Fleet,
        distances: DistanceMatrix,
    ) -> Result<Self, ModelError> {
        if distances.size() != customers.len() {
            return Err(ModelError::malformed(format!(
                "distance table covers {} customers, instance has {}",
                distances.size(),
                customers.len()
            )));
        }
        let instance = Self {
            kind,
            depot,
            customers,
            fleet,
            distances,
        };
        instance.validate()?;
        debug!(
            kind = ?instance.kind,
            customers = instance.num_customers(),
            vehicles = instance.fleet.vehicles(),
            capacity = instance.fleet.capacity(),
            "instance built"
        );
        Ok(instance)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.fleet.vehicles() == 0 {
            return Err(ModelError::infeasible("fleet has no vehicles"));
        }
        let n = self.customers.len();
        for (idx, c) in self.customers.iter().enumerate() {
            if c.id() != idx {
                return Err(ModelError::malformed(format!(
                    "customer at position {idx} has id {}",
                    c.id()
                )));
            }
            let Some(pairing) = c.pairing() else {
                continue;
            };
            let partner = pairing.partner();
            if partner >= n || partner == idx {
                return Err(ModelError::infeasible(format!(
                    "customer {idx} is paired with invalid index {partner}"
                )));
            }
            let expected = match pairing {
                Pairing::Pickup { .. } => Pairing::Delivery { pickup: idx },
                Pairing::Delivery { .. } => Pairing::Pickup { delivery: idx },
            };
            if self.customers[partner].pairing() != Some(expected) {
                return Err(ModelError::infeasible(format!(
                    "pair link {idx} -> {partner} is not mirrored"
                )));
            }
        }
        Ok(())
    }

    /// Fails when a single customer's demand exceeds the vehicle capacity,
    /// which no route can then carry under a hard capacity limit.
    pub fn check_capacity_fit(&self) -> Result<(), ModelError> {
        let capacity = self.fleet.capacity();
        match self.customers.iter().find(|c| c.demand() > capacity) {
            Some(c) => Err(ModelError::infeasible(format!(
                "customer {} demand {} exceeds vehicle capacity {capacity}",
                c.id(),
                c.demand()
            ))),
            None => Ok(()),
        }
    }

    /// Returns a copy with a different number of vehicles.
    pub fn with_vehicles(mut self, vehicles: usize) -> Result<Self, ModelError> {
        self.fleet = self.fleet.with_vehicles(vehicles);
        self.validate()?;
        Ok(self)
    }

    /// Problem family.
    pub fn kind(&self) -> ProblemKind {
        self.kind
    }

    /// Depot coordinates.
    pub fn depot(&self) -> (f64, f64) {
        self.depot
    }

    /// All customers, indexed `0..n`.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Customer at `index`.
    pub fn customer(&self, index: usize) -> &Customer {
        &self.customers[index]
    }

    /// Number of customers.
    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    /// Fleet description.
    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    /// Distance table.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// `(pickup, delivery)` index pairs in pickup order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.customers
            .iter()
            .filter_map(|c| match c.pairing() {
                Some(Pairing::Pickup { delivery }) => Some((c.id(), delivery)),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired_customers() -> Vec<Customer> {
        vec![
            Customer::new(0, 1.0, 0.0, 10).with_pairing(Pairing::Pickup { delivery: 1 }),
            Customer::new(1, 2.0, 0.0, -10).with_pairing(Pairing::Delivery { pickup: 0 }),
        ]
    }

    #[test]
    fn test_kind_properties() {
        assert_eq!(ProblemKind::Cvrp.rounding(), Rounding::Nearest);
        assert!(!ProblemKind::Cvrp.has_time_windows());
        assert!(ProblemKind::Cvrptw.has_time_windows());
        assert!(ProblemKind::Pdptw.has_pairs());
        assert_eq!(ProblemKind::Pdptw.distance_decimals(), Some(2));
        assert_eq!(ProblemKind::Cvrp.distance_decimals(), None);
    }

    #[test]
    fn test_pairs() {
        let inst = Instance::new(
            ProblemKind::Pdptw,
            (0.0, 0.0),
            paired_customers(),
            Fleet::new(1, 10),
        )
        .expect("valid");
        assert_eq!(inst.pairs().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    fn test_unmirrored_pair_rejected() {
        let customers = vec![
            Customer::new(0, 1.0, 0.0, 10).with_pairing(Pairing::Pickup { delivery: 1 }),
            Customer::new(1, 2.0, 0.0, -10),
        ];
        let err = Instance::new(ProblemKind::Pdptw, (0.0, 0.0), customers, Fleet::new(1, 10))
            .unwrap_err();
        assert!(matches!(err, ModelError::InfeasibleStructural(_)));
    }

    #[test]
    fn test_out_of_range_pair_rejected() {
        let customers =
            vec![Customer::new(0, 1.0, 0.0, 10).with_pairing(Pairing::Pickup { delivery: 9 })];
        let err = Instance::new(ProblemKind::Pdptw, (0.0, 0.0), customers, Fleet::new(1, 10))
            .unwrap_err();
        assert!(matches!(err, ModelError::InfeasibleStructural(_)));
    }

    #[test]
    fn test_oversized_demand_rejected() {
        let customers = vec![Customer::new(0, 1.0, 0.0, 11)];
        let instance = Instance::new(ProblemKind::Cvrp, (0.0, 0.0), customers, Fleet::new(1, 10))
            .unwrap();
        let err = instance.check_capacity_fit().unwrap_err();
        assert!(matches!(err, ModelError::InfeasibleStructural(_)));
        assert!(err.to_string().contains("customer 0 demand 11"));
    }

    #[test]
    fn test_empty_fleet_rejected() {
        let customers = vec![Customer::new(0, 1.0, 0.0, 1)];
        let err = Instance::new(ProblemKind::Cvrp, (0.0, 0.0), customers, Fleet::new(0, 10))
            .unwrap_err();
        assert!(matches!(err, ModelError::InfeasibleStructural(_)));
    }

    #[test]
    fn test_id_mismatch_rejected() {
        let customers = vec![Customer::new(1, 1.0, 0.0, 1)];
        let err = Instance::new(ProblemKind::Cvrp, (0.0, 0.0), customers, Fleet::new(1, 10))
            .unwrap_err();
        assert!(matches!(err, ModelError::MalformedInstance(_)));
    }

    #[test]
    fn test_with_vehicles() {
        let inst = Instance::new(
            ProblemKind::Cvrp,
            (0.0, 0.0),
            vec![Customer::new(0, 1.0, 0.0, 1)],
            Fleet::new(1, 10),
        )
        .expect("valid")
        .with_vehicles(5)
        .expect("valid");
        assert_eq!(inst.fleet().vehicles(), 5);
    }
}
