//! Lexicographic objective: lateness, then fleet size, then distance.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::distance::round_to_decimals;
use crate::models::RouteSummary;

/// One minimization tier, in the order it is registered with an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveTier {
    /// Total lateness over all routes (plus overload when capacity is
    /// penalized). Zero at a time-feasible solution.
    TotalLateness,
    /// Number of routes visiting at least one customer.
    VehiclesUsed,
    /// Total travel distance, optionally rounded to a number of decimals.
    TotalDistance {
        /// Decimal precision, `None` keeps the raw sum.
        decimals: Option<u32>,
    },
}

impl ObjectiveTier {
    /// Value of this tier in an objective.
    pub fn value(&self, objective: &Objective) -> f64 {
        match self {
            ObjectiveTier::TotalLateness => objective.lateness,
            ObjectiveTier::VehiclesUsed => objective.vehicles_used as f64,
            ObjectiveTier::TotalDistance { .. } => objective.distance,
        }
    }
}

/// Aggregated objective values of a full assignment.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use u_routing_model::evaluation::Objective;
///
/// let a = Objective { lateness: 0.0, vehicles_used: 3, distance: 900.0 };
/// let b = Objective { lateness: 0.0, vehicles_used: 2, distance: 1200.0 };
/// // fewer vehicles wins before distance is compared
/// assert_eq!(b.lex_cmp(&a), Ordering::Less);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Objective {
    /// Tier 1: total lateness.
    pub lateness: f64,
    /// Tier 2: used route slots.
    pub vehicles_used: usize,
    /// Tier 3: total distance.
    pub distance: f64,
}

impl Objective {
    /// Sums route summaries; the distance is rounded to `decimals` if given.
    pub fn from_summaries<'a, I>(summaries: I, decimals: Option<u32>) -> Self
    where
        I: IntoIterator<Item = &'a RouteSummary>,
    {
        let mut objective = Objective::default();
        for s in summaries {
            objective.lateness += s.lateness;
            objective.vehicles_used += usize::from(s.used);
            objective.distance += s.distance;
        }
        if let Some(d) = decimals {
            objective.distance = round_to_decimals(objective.distance, d);
        }
        objective
    }

    /// Compares tier by tier; a lower tier only matters when all higher
    /// tiers are tied.
    pub fn lex_cmp(&self, other: &Objective) -> Ordering {
        self.lateness
            .total_cmp(&other.lateness)
            .then(self.vehicles_used.cmp(&other.vehicles_used))
            .then(self.distance.total_cmp(&other.distance))
    }

    /// Scalarizes as `lateness * big + vehicles * medium + distance` for
    /// engines without native lexicographic minimization.
    pub fn weighted(&self, weights: &ObjectiveWeights) -> f64 {
        self.lateness * weights.big + self.vehicles_used as f64 * weights.medium + self.distance
    }
}

/// Constant weights for the scalarized objective.
///
/// `medium` must exceed any reachable total distance and `big` must exceed
/// `medium` times the fleet size for the order to be preserved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    /// Weight of the lateness tier.
    pub big: f64,
    /// Weight of the vehicle-count tier.
    pub medium: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            big: 1e10,
            medium: 1e5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(lateness: f64, distance: f64, used: bool) -> RouteSummary {
        RouteSummary {
            max_load: 0,
            lateness,
            distance,
            used,
        }
    }

    #[test]
    fn test_from_summaries() {
        let routes = [
            summary(1.5, 10.004, true),
            summary(0.0, 0.0, false),
            summary(0.5, 20.0, true),
        ];
        let obj = Objective::from_summaries(&routes, Some(2));
        assert_eq!(obj.lateness, 2.0);
        assert_eq!(obj.vehicles_used, 2);
        assert_eq!(obj.distance, 30.0);
    }

    #[test]
    fn test_lateness_dominates() {
        let feasible = Objective {
            lateness: 0.0,
            vehicles_used: 10,
            distance: 5000.0,
        };
        let late = Objective {
            lateness: 0.1,
            vehicles_used: 1,
            distance: 10.0,
        };
        assert_eq!(feasible.lex_cmp(&late), Ordering::Less);
    }

    #[test]
    fn test_distance_breaks_ties() {
        let a = Objective {
            lateness: 0.0,
            vehicles_used: 2,
            distance: 10.0,
        };
        let b = Objective {
            distance: 11.0,
            ..a
        };
        assert_eq!(a.lex_cmp(&b), Ordering::Less);
        assert_eq!(a.lex_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_weighted_preserves_order() {
        let w = ObjectiveWeights::default();
        let a = Objective {
            lateness: 0.0,
            vehicles_used: 2,
            distance: 9000.0,
        };
        let b = Objective {
            lateness: 0.0,
            vehicles_used: 3,
            distance: 100.0,
        };
        assert!(a.weighted(&w) < b.weighted(&w));
    }

    #[test]
    fn test_tier_values() {
        let obj = Objective {
            lateness: 3.0,
            vehicles_used: 4,
            distance: 5.0,
        };
        assert_eq!(ObjectiveTier::TotalLateness.value(&obj), 3.0);
        assert_eq!(ObjectiveTier::VehiclesUsed.value(&obj), 4.0);
        assert_eq!(ObjectiveTier::TotalDistance { decimals: None }.value(&obj), 5.0);
    }
}
