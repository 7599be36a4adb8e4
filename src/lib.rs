//! # u-routing-model
//!
//! Sequence-based routing models (CVRP, CVRPTW, PDPTW) built on top of a
//! black-box optimization engine, with a cumulative route evaluator that
//! derives load, timing, lateness and distance from a candidate sequence.
//!
//! ## Modules
//!
//! - [`models`]: Instance data (Customer, Fleet, Instance), route aggregates, solutions
//! - [`distance`]: Distance table with family-specific rounding
//! - [`evaluation`]: Cumulative route evaluator, constraint checks, lexicographic objective
//! - [`engine`]: Declarative engine protocol, scripted and local-search engines
//! - [`model`]: Declares an instance on an engine and reads the result back
//! - [`parsers`]: Augerat, Solomon and Li & Lim readers
//! - [`output`]: Text and JSON solution writers
//! - [`config`]: Solve configuration
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use u_routing_model::engine::{Budget, Engine, LocalSearchEngine};
//! use u_routing_model::model::{CapacityMode, RoutingModel};
//! use u_routing_model::models::{Customer, Fleet, Instance, ProblemKind, TimeWindow};
//!
//! let tw = TimeWindow::new(0.0, 100.0).unwrap();
//! let customers = vec![
//!     Customer::new(0, 3.0, 4.0, 4).with_time_window(tw).with_service_duration(1.0),
//!     Customer::new(1, 6.0, 8.0, 4).with_time_window(tw).with_service_duration(1.0),
//! ];
//! let fleet = Fleet::new(2, 10).with_horizon(100.0);
//! let instance = Instance::new(ProblemKind::Cvrptw, (0.0, 0.0), customers, fleet).unwrap();
//!
//! let mut engine = LocalSearchEngine::new().with_seed(1);
//! let model = RoutingModel::build(&mut engine, Arc::new(instance), CapacityMode::Hard).unwrap();
//! engine.solve(&Budget::iterations(500)).unwrap();
//!
//! let evaluation = model.evaluate(&model.read_solution(&engine).unwrap()).unwrap();
//! assert!(evaluation.is_feasible());
//! assert_eq!(evaluation.objective.lateness, 0.0);
//! assert_eq!(evaluation.objective.vehicles_used, 1);
//! assert_eq!(evaluation.objective.distance, 20.0);
//! ```

pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod models;
pub mod output;
pub mod parsers;
