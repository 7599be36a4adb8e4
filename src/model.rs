//! Declares a routing instance on an [`Engine`] and reads the result back.
//!
//! Construction is the same for all three families:
//!
//! 1. one list variable over `0..n` per vehicle, all under a partition
//! 2. a capacity threshold on the maximum prefix load of every route
//! 3. `SameRoute` + `Precedes` for every pickup/delivery pair
//! 4. the cumulative route fold as the candidate evaluator
//! 5. the objective tiers of the family (lateness, vehicles, distance)

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{CandidateEvaluator, Constraint, Engine, SequenceVar};
use crate::error::{EngineError, ModelError};
use crate::evaluation::{check_all, Objective, ObjectiveTier, RouteEvaluator};
use crate::models::{Instance, ProblemKind, RouteAggregate, RouteSummary, Solution, Violation};

/// How the vehicle capacity enters the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityMode {
    /// Capacity is a hard threshold on every route.
    #[default]
    Hard,
    /// Overload is added to the lateness tier instead of being forbidden.
    Penalized,
}

/// Route fold registered with the engine: the cumulative evaluator plus,
/// in penalized mode, the overload folded into lateness.
struct InstanceEvaluator {
    instance: Arc<Instance>,
    mode: CapacityMode,
}

impl InstanceEvaluator {
    fn summarize(&self, sequence: &[usize]) -> Result<RouteSummary, ModelError> {
        let mut summary = RouteEvaluator::new(&self.instance).summarize(sequence)?;
        if self.mode == CapacityMode::Penalized {
            let overload = summary.max_load - self.instance.fleet().capacity();
            summary.lateness += f64::from(overload.max(0));
        }
        Ok(summary)
    }
}

impl CandidateEvaluator for InstanceEvaluator {
    fn evaluate_route(&self, sequence: &[usize]) -> Result<RouteSummary, ModelError> {
        self.summarize(sequence)
    }
}

/// Objective tiers of a problem family, highest priority first.
///
/// # Examples
///
/// ```
/// use u_routing_model::evaluation::ObjectiveTier;
/// use u_routing_model::model::{objective_tiers, CapacityMode};
/// use u_routing_model::models::ProblemKind;
///
/// let tiers = objective_tiers(ProblemKind::Cvrp, CapacityMode::Hard);
/// assert_eq!(tiers[0], ObjectiveTier::VehiclesUsed);
/// assert_eq!(objective_tiers(ProblemKind::Pdptw, CapacityMode::Hard).len(), 3);
/// ```
pub fn objective_tiers(kind: ProblemKind, mode: CapacityMode) -> Vec<ObjectiveTier> {
    let mut tiers = Vec::with_capacity(3);
    if kind.has_time_windows() || mode == CapacityMode::Penalized {
        tiers.push(ObjectiveTier::TotalLateness);
    }
    tiers.push(ObjectiveTier::VehiclesUsed);
    tiers.push(ObjectiveTier::TotalDistance {
        decimals: kind.distance_decimals(),
    });
    tiers
}

/// Evaluation of a full assignment against the instance.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Per-route aggregates, one per vehicle slot.
    #[serde(skip)]
    pub routes: Vec<RouteAggregate>,
    /// Objective values.
    pub objective: Objective,
    /// Hard-constraint violations; empty for a feasible assignment.
    pub violations: Vec<Violation>,
}

impl Evaluation {
    /// Returns `true` if no hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A routing instance declared on an engine.
#[derive(Debug, Clone)]
pub struct RoutingModel {
    instance: Arc<Instance>,
    vars: Vec<SequenceVar>,
    mode: CapacityMode,
    tiers: Vec<ObjectiveTier>,
}

impl RoutingModel {
    /// Declares variables, constraints, the route fold and the objective on
    /// `engine`.
    ///
    /// Under [`CapacityMode::Hard`] a customer whose demand alone exceeds
    /// the capacity fails the build; under `Penalized` it is only overload.
    pub fn build<E: Engine + ?Sized>(
        engine: &mut E,
        instance: Arc<Instance>,
        mode: CapacityMode,
    ) -> Result<Self, EngineError> {
        if mode == CapacityMode::Hard {
            instance
                .check_capacity_fit()
                .map_err(|e| EngineError::Failed(e.to_string()))?;
        }
        let n = instance.num_customers();
        let fleet = instance.fleet();

        let vars: Vec<SequenceVar> = (0..fleet.vehicles()).map(|_| engine.list_var(n)).collect();
        engine.constraint(Constraint::Partition(vars.clone()))?;

        if mode == CapacityMode::Hard {
            for &var in &vars {
                engine.constraint(Constraint::Capacity {
                    var,
                    limit: fleet.capacity(),
                })?;
            }
        }

        let mut pairs = 0;
        for (pickup, delivery) in instance.pairs() {
            engine.constraint(Constraint::SameRoute { pickup, delivery })?;
            engine.constraint(Constraint::Precedes { pickup, delivery })?;
            pairs += 1;
        }

        engine.evaluator(Arc::new(InstanceEvaluator {
            instance: Arc::clone(&instance),
            mode,
        }));

        let tiers = objective_tiers(instance.kind(), mode);
        for &tier in &tiers {
            engine.minimize(tier);
        }

        info!(
            kind = ?instance.kind(),
            customers = n,
            vehicles = vars.len(),
            pairs,
            capacity_mode = ?mode,
            "routing model declared"
        );

        Ok(Self {
            instance,
            vars,
            mode,
            tiers,
        })
    }

    /// The modeled instance.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// One sequence variable per vehicle.
    pub fn vars(&self) -> &[SequenceVar] {
        &self.vars
    }

    /// Capacity mode used at construction.
    pub fn capacity_mode(&self) -> CapacityMode {
        self.mode
    }

    /// Registered objective tiers, highest priority first.
    pub fn tiers(&self) -> &[ObjectiveTier] {
        &self.tiers
    }

    /// Reads the assigned sequences back from the engine.
    pub fn read_solution<E: Engine + ?Sized>(&self, engine: &E) -> Result<Solution, EngineError> {
        let routes = self
            .vars
            .iter()
            .map(|&var| engine.sequence_value(var))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Solution::new(routes))
    }

    /// Evaluates an assignment: aggregates, objective and violations.
    ///
    /// # Errors
    ///
    /// `EvaluationDomain` if a route references an unknown customer.
    pub fn evaluate(&self, solution: &Solution) -> Result<Evaluation, ModelError> {
        let fold = InstanceEvaluator {
            instance: Arc::clone(&self.instance),
            mode: self.mode,
        };
        let evaluator = RouteEvaluator::new(&self.instance);

        let mut routes = Vec::with_capacity(solution.num_routes());
        let mut summaries = Vec::with_capacity(solution.num_routes());
        for seq in solution.routes() {
            routes.push(evaluator.evaluate(seq)?);
            summaries.push(fold.summarize(seq)?);
        }

        let objective =
            Objective::from_summaries(&summaries, self.instance.kind().distance_decimals());
        let violations = check_all(&self.instance, solution, self.mode == CapacityMode::Hard)?;
        Ok(Evaluation {
            routes,
            objective,
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Budget, LocalSearchEngine, ScriptedEngine};
    use crate::models::{Customer, Fleet, Pairing, TimeWindow};

    /// Five customers at unit distance from the depot and from each other
    /// along a line, demand 1 each.
    fn unit_cvrp(vehicles: usize, capacity: i32) -> Arc<Instance> {
        let customers = (0..5)
            .map(|i| Customer::new(i, 1.0, 0.0, 1))
            .collect::<Vec<_>>();
        let mut dm = crate::distance::DistanceMatrix::new(5);
        for i in 0..5 {
            dm.set_depot(i, 1.0);
            for j in 0..5 {
                if i != j {
                    dm.set(i, j, 1.0);
                }
            }
        }
        Arc::new(
            Instance::with_distances(
                ProblemKind::Cvrp,
                (0.0, 0.0),
                customers,
                Fleet::new(vehicles, capacity),
                dm,
            )
            .expect("valid"),
        )
    }

    fn pdptw() -> Arc<Instance> {
        let tw = TimeWindow::new(0.0, 1000.0).expect("valid");
        let customers = vec![
            Customer::new(0, 1.0, 0.0, 5)
                .with_time_window(tw)
                .with_pairing(Pairing::Pickup { delivery: 1 }),
            Customer::new(1, 2.0, 0.0, -5)
                .with_time_window(tw)
                .with_pairing(Pairing::Delivery { pickup: 0 }),
            Customer::new(2, 0.0, 3.0, 5)
                .with_time_window(tw)
                .with_pairing(Pairing::Pickup { delivery: 3 }),
            Customer::new(3, 0.0, 4.0, -5)
                .with_time_window(tw)
                .with_pairing(Pairing::Delivery { pickup: 2 }),
        ];
        Arc::new(
            Instance::new(
                ProblemKind::Pdptw,
                (0.0, 0.0),
                customers,
                Fleet::new(2, 5).with_horizon(1000.0),
            )
            .expect("valid"),
        )
    }

    #[test]
    fn test_build_declares_everything() {
        let instance = pdptw();
        let mut engine = ScriptedEngine::new(vec![vec![0, 1, 2, 3]]);
        let model =
            RoutingModel::build(&mut engine, Arc::clone(&instance), CapacityMode::Hard).expect("built");
        assert_eq!(model.vars().len(), 2);
        assert_eq!(engine.model().num_vars(), 2);
        assert_eq!(engine.model().same_route_partner(0), Some(1));
        assert_eq!(engine.model().pickup_of(3), Some(2));
        assert_eq!(engine.model().tiers().len(), 3);
        assert_eq!(engine.model().tiers()[0], ObjectiveTier::TotalLateness);
    }

    #[test]
    fn test_cvrp_unit_scenario() {
        let instance = unit_cvrp(5, 5);
        let mut engine = ScriptedEngine::new(vec![vec![0, 1, 2], vec![3, 4]]);
        let model = RoutingModel::build(&mut engine, instance, CapacityMode::Hard).expect("built");
        let report = engine.solve(&Budget::default()).expect("solved");
        // vehicles, distance: (3 + 1) + (2 + 1)
        assert_eq!(report.score.tiers, vec![2.0, 7.0]);

        let solution = model.read_solution(&engine).expect("read");
        let eval = model.evaluate(&solution).expect("valid");
        assert!(eval.is_feasible());
        assert_eq!(eval.objective.vehicles_used, 2);
        assert_eq!(eval.objective.distance, 7.0);
        assert_eq!(eval.routes[0].distance(), 4.0);
    }

    #[test]
    fn test_hard_capacity_violation_reported() {
        let instance = unit_cvrp(2, 2);
        let mut engine = ScriptedEngine::new(vec![vec![0, 1, 2], vec![3, 4]]);
        let model = RoutingModel::build(&mut engine, instance, CapacityMode::Hard).expect("built");
        let report = engine.solve(&Budget::default()).expect("solved");
        assert!(!report.score.is_feasible());
        let eval = model
            .evaluate(&model.read_solution(&engine).expect("read"))
            .expect("valid");
        assert_eq!(eval.violations.len(), 1);
    }

    #[test]
    fn test_penalized_capacity_flows_into_lateness() {
        let instance = unit_cvrp(2, 2);
        let mut engine = ScriptedEngine::new(vec![vec![0, 1, 2], vec![3, 4]]);
        let model =
            RoutingModel::build(&mut engine, instance, CapacityMode::Penalized).expect("built");
        assert_eq!(model.tiers()[0], ObjectiveTier::TotalLateness);
        let report = engine.solve(&Budget::default()).expect("solved");
        assert!(report.score.is_feasible());
        assert_eq!(report.score.tiers[0], 1.0);

        let eval = model
            .evaluate(&model.read_solution(&engine).expect("read"))
            .expect("valid");
        assert!(eval.is_feasible());
        assert_eq!(eval.objective.lateness, 1.0);
    }

    #[test]
    fn test_oversized_demand_depends_on_mode() {
        let mut engine = ScriptedEngine::new(vec![vec![0, 1, 2], vec![3, 4]]);
        let err = RoutingModel::build(&mut engine, unit_cvrp(2, 0), CapacityMode::Hard)
            .expect_err("cannot fit");
        assert!(err.to_string().contains("exceeds vehicle capacity"));
        assert_eq!(engine.model().num_vars(), 0);

        let mut engine = ScriptedEngine::new(vec![vec![0, 1, 2], vec![3, 4]]);
        let model = RoutingModel::build(&mut engine, unit_cvrp(2, 0), CapacityMode::Penalized)
            .expect("built");
        let report = engine.solve(&Budget::default()).expect("solved");
        assert!(report.score.is_feasible());
        // overload 3 + 2
        assert_eq!(report.score.tiers[0], 5.0);
        let eval = model
            .evaluate(&model.read_solution(&engine).expect("read"))
            .expect("valid");
        assert_eq!(eval.objective.lateness, 5.0);
    }

    #[test]
    fn test_pdptw_solve_keeps_precedence() {
        let instance = pdptw();
        let mut engine = LocalSearchEngine::new().with_seed(3);
        let model = RoutingModel::build(&mut engine, instance, CapacityMode::Hard).expect("built");
        let report = engine.solve(&Budget::iterations(2_000)).expect("solved");
        assert!(report.score.is_feasible());
        let eval = model
            .evaluate(&model.read_solution(&engine).expect("read"))
            .expect("valid");
        assert!(eval.is_feasible());
    }

    #[test]
    fn test_evaluate_unknown_customer() {
        let instance = unit_cvrp(2, 5);
        let mut engine = ScriptedEngine::new(vec![]);
        let model = RoutingModel::build(&mut engine, instance, CapacityMode::Hard).expect("built");
        let bad = Solution::new(vec![vec![0, 9], vec![]]);
        assert!(matches!(
            model.evaluate(&bad),
            Err(ModelError::EvaluationDomain { index: 9, .. })
        ));
    }
}
