//! Derived per-route quantities.

/// State of a route right after serving one customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visit {
    /// Customer being visited.
    pub customer_id: usize,
    /// Running load after this visit (prefix sum of demands).
    pub load_after: i32,
    /// End of service at this customer.
    pub end_time: f64,
    /// `max(0, end_time - latest_end)` of this customer.
    pub lateness: f64,
}

/// Everything derived from one candidate sequence.
///
/// Recomputed on every evaluation and never cached across candidates.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::RouteAggregate;
///
/// let empty = RouteAggregate::empty();
/// assert!(!empty.is_used());
/// assert_eq!(empty.distance(), 0.0);
/// assert_eq!(empty.total_lateness(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteAggregate {
    visits: Vec<Visit>,
    distance: f64,
    home_lateness: f64,
}

impl RouteAggregate {
    /// Aggregate of an unused route.
    pub fn empty() -> Self {
        Self {
            visits: Vec::new(),
            distance: 0.0,
            home_lateness: 0.0,
        }
    }

    pub(crate) fn new(visits: Vec<Visit>, distance: f64, home_lateness: f64) -> Self {
        Self {
            visits,
            distance,
            home_lateness,
        }
    }

    /// Per-position visit state.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Number of visits.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if the route has no visits.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Usage flag: the route visits at least one customer.
    pub fn is_used(&self) -> bool {
        !self.visits.is_empty()
    }

    /// Running load at each position.
    pub fn loads(&self) -> Vec<i32> {
        self.visits.iter().map(|v| v.load_after).collect()
    }

    /// End of service at each position.
    pub fn end_times(&self) -> Vec<f64> {
        self.visits.iter().map(|v| v.end_time).collect()
    }

    /// Lateness at each position.
    pub fn lateness(&self) -> Vec<f64> {
        self.visits.iter().map(|v| v.lateness).collect()
    }

    /// Maximum prefix load, zero for an empty route.
    pub fn max_load(&self) -> i32 {
        self.visits
            .iter()
            .map(|v| v.load_after)
            .max()
            .unwrap_or(0)
    }

    /// Depot-to-depot travel distance.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Lateness of the return to the depot.
    pub fn home_lateness(&self) -> f64 {
        self.home_lateness
    }

    /// Home lateness plus the lateness of every visit.
    pub fn total_lateness(&self) -> f64 {
        self.home_lateness + self.visits.iter().map(|v| v.lateness).sum::<f64>()
    }

    /// Customer ids in visit order.
    pub fn customer_ids(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.customer_id).collect()
    }
}

/// Route totals computed without per-position buffers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteSummary {
    /// Maximum prefix load.
    pub max_load: i32,
    /// Home lateness plus visit lateness.
    pub lateness: f64,
    /// Depot-to-depot travel distance.
    pub distance: f64,
    /// Route visits at least one customer.
    pub used: bool,
}

impl From<&RouteAggregate> for RouteSummary {
    fn from(agg: &RouteAggregate) -> Self {
        Self {
            max_load: agg.max_load(),
            lateness: agg.total_lateness(),
            distance: agg.distance(),
            used: agg.is_used(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RouteAggregate {
        RouteAggregate::new(
            vec![
                Visit {
                    customer_id: 4,
                    load_after: 10,
                    end_time: 5.0,
                    lateness: 0.0,
                },
                Visit {
                    customer_id: 2,
                    load_after: 3,
                    end_time: 9.0,
                    lateness: 1.5,
                },
            ],
            12.0,
            2.0,
        )
    }

    #[test]
    fn test_accessors() {
        let agg = sample();
        assert_eq!(agg.len(), 2);
        assert!(agg.is_used());
        assert_eq!(agg.loads(), vec![10, 3]);
        assert_eq!(agg.end_times(), vec![5.0, 9.0]);
        assert_eq!(agg.customer_ids(), vec![4, 2]);
        assert_eq!(agg.max_load(), 10);
        assert_eq!(agg.total_lateness(), 3.5);
    }

    #[test]
    fn test_summary_from_aggregate() {
        let s = RouteSummary::from(&sample());
        assert_eq!(s.max_load, 10);
        assert_eq!(s.lateness, 3.5);
        assert_eq!(s.distance, 12.0);
        assert!(s.used);
    }

    #[test]
    fn test_empty() {
        let agg = RouteAggregate::empty();
        assert!(agg.is_empty());
        assert_eq!(agg.max_load(), 0);
        assert_eq!(RouteSummary::from(&agg), RouteSummary::default());
    }
}
