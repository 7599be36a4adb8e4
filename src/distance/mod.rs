//! Distance tables.
//!
//! Provides the dense customer distance matrix with its depot vector and the
//! rounding policies used by the different instance families.

mod matrix;

pub use matrix::{round_to_decimals, DistanceMatrix, Rounding};
