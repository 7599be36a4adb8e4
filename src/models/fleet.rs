//! Homogeneous fleet of interchangeable route slots.

/// The vehicles available to an instance.
///
/// All vehicles share the same capacity and must be back at the depot by
/// the planning horizon; a late return only adds lateness.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::Fleet;
///
/// let fleet = Fleet::new(25, 200).with_horizon(1236.0);
/// assert_eq!(fleet.vehicles(), 25);
/// assert_eq!(fleet.capacity(), 200);
/// assert_eq!(fleet.horizon(), 1236.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Fleet {
    vehicles: usize,
    capacity: i32,
    horizon: f64,
}

impl Fleet {
    /// Creates a fleet with no return deadline.
    pub fn new(vehicles: usize, capacity: i32) -> Self {
        Self {
            vehicles,
            capacity,
            horizon: f64::INFINITY,
        }
    }

    /// Sets the latest allowed return time at the depot.
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Replaces the number of vehicles.
    pub fn with_vehicles(mut self, vehicles: usize) -> Self {
        self.vehicles = vehicles;
        self
    }

    /// Number of route slots.
    pub fn vehicles(&self) -> usize {
        self.vehicles
    }

    /// Capacity of every vehicle.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Planning horizon (latest return to depot).
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Lateness of a vehicle arriving home at `arrival`.
    pub fn home_lateness(&self, arrival: f64) -> f64 {
        (arrival - self.horizon).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_defaults() {
        let f = Fleet::new(3, 100);
        assert_eq!(f.vehicles(), 3);
        assert_eq!(f.capacity(), 100);
        assert!(f.horizon().is_infinite());
        assert_eq!(f.home_lateness(1e9), 0.0);
    }

    #[test]
    fn test_home_lateness() {
        let f = Fleet::new(1, 10).with_horizon(100.0);
        assert_eq!(f.home_lateness(90.0), 0.0);
        assert_eq!(f.home_lateness(112.5), 12.5);
    }

    #[test]
    fn test_with_vehicles() {
        let f = Fleet::new(1, 10).with_vehicles(4);
        assert_eq!(f.vehicles(), 4);
    }
}
