//! Dense customer distance matrix with a depot-distance vector.

use serde::{Deserialize, Serialize};

use crate::models::Customer;

/// Rounding applied to each pairwise distance when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    /// Nearest integer, `floor(d + 0.5)` (Augerat CVRP instances).
    Nearest,
    /// Unrounded double (Solomon and Li&Lim instances).
    Exact,
}

impl Rounding {
    /// Applies the rounding policy to a raw Euclidean distance.
    pub fn apply(self, distance: f64) -> f64 {
        match self {
            Rounding::Nearest => (distance + 0.5).floor(),
            Rounding::Exact => distance,
        }
    }
}

/// Rounds `value` to a fixed number of decimals, `round(value * 10^d) / 10^d`.
///
/// Used only on the final total-distance objective so the engine does not
/// chase floating-point noise.
///
/// # Examples
///
/// ```
/// use u_routing_model::distance::round_to_decimals;
///
/// assert_eq!(round_to_decimals(828.936_87, 2), 828.94);
/// assert_eq!(round_to_decimals(12.0, 2), 12.0);
/// ```
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// A dense n×n customer distance matrix stored in row-major order, plus the
/// distance of every customer to the depot.
///
/// Customer indices are 0-based; the depot has no row of its own.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::Customer;
/// use u_routing_model::distance::{DistanceMatrix, Rounding};
///
/// let customers = vec![
///     Customer::new(0, 3.0, 4.0, 10),
///     Customer::new(1, 6.0, 8.0, 20),
/// ];
/// let dm = DistanceMatrix::from_customers((0.0, 0.0), &customers, Rounding::Exact);
/// assert!((dm.depot(0) - 5.0).abs() < 1e-10);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    depot: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a matrix for `size` customers, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            depot: vec![0.0; size],
            size,
        }
    }

    /// Computes the Euclidean table from the depot and customer coordinates.
    pub fn from_customers(depot: (f64, f64), customers: &[Customer], rounding: Rounding) -> Self {
        let n = customers.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = rounding.apply(customers[i].distance_to(&customers[j]));
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
            dm.depot[i] = rounding.apply(customers[i].distance_to_point(depot.0, depot.1));
        }
        dm
    }

    /// Creates a matrix from an explicit n×n grid and depot vector.
    ///
    /// Returns `None` if the lengths don't match `size`.
    pub fn from_data(size: usize, data: Vec<f64>, depot: Vec<f64>) -> Option<Self> {
        if data.len() != size * size || depot.len() != size {
            return None;
        }
        Some(Self { data, depot, size })
    }

    /// Travel distance from customer `from` to customer `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from customer `from` to customer `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Distance between the depot and customer `customer`.
    pub fn depot(&self, customer: usize) -> f64 {
        self.depot[customer]
    }

    /// Sets the depot distance of a customer.
    pub fn set_depot(&mut self, customer: usize, distance: f64) {
        self.depot[customer] = distance;
    }

    /// Number of customers covered by this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_customers() -> Vec<Customer> {
        vec![
            Customer::new(0, 3.0, 4.0, 10),
            Customer::new(1, 0.0, 8.0, 20),
            Customer::new(2, 1.0, 1.0, 5),
        ]
    }

    #[test]
    fn test_from_customers_exact() {
        let dm = DistanceMatrix::from_customers((0.0, 0.0), &sample_customers(), Rounding::Exact);
        assert_eq!(dm.size(), 3);
        assert!((dm.depot(0) - 5.0).abs() < 1e-10);
        assert!((dm.depot(1) - 8.0).abs() < 1e-10);
        assert!((dm.depot(2) - 2f64.sqrt()).abs() < 1e-10);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert_eq!(dm.get(1, 1), 0.0);
    }

    #[test]
    fn test_from_customers_nearest() {
        let dm = DistanceMatrix::from_customers((0.0, 0.0), &sample_customers(), Rounding::Nearest);
        // sqrt(2) = 1.414 -> 1
        assert_eq!(dm.depot(2), 1.0);
        // (3,4)-(1,1): sqrt(13) = 3.606 -> 4
        assert_eq!(dm.get(0, 2), 4.0);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(Rounding::Nearest.apply(2.5), 3.0);
        assert_eq!(Rounding::Nearest.apply(2.49), 2.0);
        assert_eq!(Rounding::Exact.apply(2.49), 2.49);
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to_decimals(1.005_1, 2), 1.01);
        assert_eq!(round_to_decimals(3.14159, 2), 3.14);
        assert_eq!(round_to_decimals(0.0, 2), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let dm = DistanceMatrix::from_customers((0.0, 0.0), &sample_customers(), Rounding::Exact);
        assert!(dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 7.0, 0.0], vec![1.0, 2.0])
            .expect("valid");
        assert_eq!(dm.get(0, 1), 5.0);
        assert_eq!(dm.get(1, 0), 7.0);
        assert_eq!(dm.depot(1), 2.0);
        assert!(!dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0], vec![0.0, 0.0]).is_none());
        assert!(DistanceMatrix::from_data(2, vec![0.0; 4], vec![0.0]).is_none());
    }
}
