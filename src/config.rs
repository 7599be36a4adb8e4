//! Solve configuration shared by the CLI and library callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::Budget;
use crate::model::CapacityMode;

/// Configuration of one solve run.
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides.
///
/// # Examples
///
/// ```
/// use u_routing_model::config::SolveConfig;
/// use u_routing_model::model::CapacityMode;
///
/// let config = SolveConfig::default()
///     .with_time_limit(5.0)
///     .with_seed(42)
///     .with_capacity_mode(CapacityMode::Penalized);
/// assert!(config.validate().is_ok());
///
/// let from_file = SolveConfig::from_json(r#"{ "seed": 7, "vehicles": 12 }"#).unwrap();
/// assert_eq!(from_file.seed, 7);
/// assert_eq!(from_file.vehicles, Some(12));
/// assert_eq!(from_file.time_limit, 20.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveConfig {
    /// Wall-clock limit in seconds.
    pub time_limit: f64,

    /// Optional cap on evaluated moves.
    pub max_iterations: Option<u64>,

    /// Random seed for reproducibility.
    pub seed: u64,

    /// Overrides the vehicle count read from the instance.
    pub vehicles: Option<usize>,

    /// Hard or penalized capacity.
    pub capacity_mode: CapacityMode,

    /// Added to customer indices when writing routes (the source files
    /// number the depot 1 and the first customer 2).
    pub offset: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            time_limit: 20.0,
            max_iterations: None,
            seed: 0,
            vehicles: None,
            capacity_mode: CapacityMode::Hard,
            offset: 2,
        }
    }
}

impl SolveConfig {
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = seconds;
        self
    }

    pub fn with_max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_vehicles(mut self, vehicles: usize) -> Self {
        self.vehicles = Some(vehicles);
        self
    }

    pub fn with_capacity_mode(mut self, mode: CapacityMode) -> Self {
        self.capacity_mode = mode;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.time_limit.is_finite() || self.time_limit <= 0.0 {
            return Err(format!(
                "time_limit must be a positive number of seconds, got {}",
                self.time_limit
            ));
        }
        if self.max_iterations == Some(0) {
            return Err("max_iterations must be positive".into());
        }
        if self.vehicles == Some(0) {
            return Err("vehicles must be positive".into());
        }
        Ok(())
    }

    /// Engine budget described by this configuration.
    pub fn budget(&self) -> Budget {
        let budget = Budget::time_limit(Duration::from_secs_f64(self.time_limit.max(0.0)));
        match self.max_iterations {
            Some(n) => budget.with_max_iterations(n),
            None => budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolveConfig::default();
        assert_eq!(config.time_limit, 20.0);
        assert_eq!(config.offset, 2);
        assert_eq!(config.capacity_mode, CapacityMode::Hard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_values() {
        assert!(SolveConfig::default().with_time_limit(0.0).validate().is_err());
        assert!(SolveConfig::default()
            .with_time_limit(f64::NAN)
            .validate()
            .is_err());
        assert!(SolveConfig::default().with_max_iterations(0).validate().is_err());
        assert!(SolveConfig::default().with_vehicles(0).validate().is_err());
    }

    #[test]
    fn test_budget() {
        let budget = SolveConfig::default()
            .with_time_limit(1.5)
            .with_max_iterations(300)
            .budget();
        assert_eq!(budget.get_time_limit(), Some(Duration::from_millis(1500)));
        assert_eq!(budget.max_iterations(), Some(300));
    }

    #[test]
    fn test_from_json_capacity_mode() {
        let config = SolveConfig::from_json(r#"{ "capacity_mode": "penalized", "offset": 1 }"#)
            .expect("valid json");
        assert_eq!(config.capacity_mode, CapacityMode::Penalized);
        assert_eq!(config.offset, 1);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(SolveConfig::from_json("{ time_limit: }").is_err());
    }
}
