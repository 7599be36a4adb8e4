//! Reference engine: greedy insertion followed by randomized local search.
//!
//! # Algorithm
//!
//! 1. Cheapest insertion over the partition variables (pairs inserted
//!    together, pickup first). The time limit covers this phase too.
//! 2. Repeatedly draw a random relocate / pair relocate / swap / 2-opt move,
//!    re-run the route fold on the touched routes only, and accept the move
//!    when the score (hard violations, then each tier) does not get worse.
//!    Accepting sideways moves lets the search drift across plateaus.
//! 3. Return the best assignment seen.
//!
//! The wall clock is polled every [`CLOCK_STRIDE`] iterations.

mod construction;
mod moves;

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::{
    Budget, CandidateEvaluator, Constraint, DeclaredModel, Engine, RouteScore, SequenceVar,
    SolveReport, SolveStatus,
};
use crate::error::{EngineError, ModelError};
use crate::evaluation::ObjectiveTier;

/// Iterations between two wall-clock checks.
const CLOCK_STRIDE: u64 = 128;

/// Iteration cap applied when the budget sets no bound at all.
const DEFAULT_MAX_ITERATIONS: u64 = 100_000;

/// Seeded local-search engine.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use u_routing_model::engine::{Budget, Engine, LocalSearchEngine};
/// use u_routing_model::model::{CapacityMode, RoutingModel};
/// use u_routing_model::models::{Customer, Fleet, Instance, ProblemKind};
///
/// let customers = vec![
///     Customer::new(0, 1.0, 0.0, 3),
///     Customer::new(1, 2.0, 0.0, 3),
///     Customer::new(2, 0.0, 5.0, 3),
/// ];
/// let instance = Instance::new(ProblemKind::Cvrp, (0.0, 0.0), customers, Fleet::new(2, 6)).unwrap();
///
/// let mut engine = LocalSearchEngine::new().with_seed(42);
/// let model = RoutingModel::build(&mut engine, Arc::new(instance), CapacityMode::Hard).unwrap();
/// let report = engine.solve(&Budget::iterations(2_000)).unwrap();
/// assert!(report.score.is_feasible());
/// let solution = model.read_solution(&engine).unwrap();
/// assert_eq!(solution.num_served(), 3);
/// ```
#[derive(Clone)]
pub struct LocalSearchEngine {
    model: DeclaredModel,
    seed: u64,
    routes: Vec<Vec<usize>>,
}

impl Default for LocalSearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearchEngine {
    /// Creates an engine with seed 0.
    pub fn new() -> Self {
        Self {
            model: DeclaredModel::default(),
            seed: 0,
            routes: Vec::new(),
        }
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Random seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Declarations received so far.
    pub fn model(&self) -> &DeclaredModel {
        &self.model
    }

    fn search(&mut self, budget: &Budget) -> Result<SolveReport, ModelError> {
        let slots: Vec<usize> = match self.model.partition() {
            Some(vars) => vars.iter().map(SequenceVar::id).collect(),
            None => {
                return Err(ModelError::infeasible(
                    "local search needs a partition constraint",
                ))
            }
        };

        let deadline = budget.get_time_limit().map(|limit| Instant::now() + limit);
        let mut routes = construction::greedy_insertion(&self.model, &slots, deadline)?;
        let mut scores: Vec<RouteScore> = routes
            .iter()
            .enumerate()
            .map(|(var, seq)| self.model.route_score(var, seq))
            .collect::<Result<_, _>>()?;
        let partition_errors = self.model.partition_errors(&routes);
        let mut current = self.model.combine(&scores, partition_errors);
        debug!(hard = current.hard, tiers = ?current.tiers, "greedy insertion done");

        let mut best = current.clone();
        let mut best_routes = routes.clone();

        let max_iterations = match (budget.max_iterations(), budget.get_time_limit()) {
            (Some(max), _) => max,
            (None, Some(_)) => u64::MAX,
            (None, None) => DEFAULT_MAX_ITERATIONS,
        };
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut iterations = 0u64;
        let mut improvements = 0u64;

        while iterations < max_iterations {
            if iterations % CLOCK_STRIDE == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            iterations += 1;

            let Some(changes) = moves::random_move(&self.model, &routes, &slots, &mut rng) else {
                continue;
            };

            let mut candidate_scores = scores.clone();
            for (var, seq) in &changes {
                candidate_scores[*var] = self.model.route_score(*var, seq)?;
            }
            let candidate = self.model.combine(&candidate_scores, partition_errors);
            if candidate.lex_cmp(&current) == Ordering::Greater {
                continue;
            }

            for (var, seq) in changes {
                routes[var] = seq;
            }
            scores = candidate_scores;
            current = candidate;

            if current.lex_cmp(&best) == Ordering::Less {
                best = current.clone();
                best_routes.clone_from(&routes);
                improvements += 1;
                debug!(iteration = iterations, hard = best.hard, tiers = ?best.tiers, "new best");
            }
        }

        info!(
            iterations,
            improvements,
            hard = best.hard,
            tiers = ?best.tiers,
            "local search finished"
        );

        self.routes = best_routes;
        let status = if best.is_feasible() {
            SolveStatus::Feasible
        } else {
            SolveStatus::Infeasible
        };
        Ok(SolveReport {
            status,
            score: best,
            iterations,
        })
    }
}

impl Engine for LocalSearchEngine {
    fn list_var(&mut self, domain: usize) -> SequenceVar {
        self.routes.push(Vec::new());
        self.model.list_var(domain)
    }

    fn constraint(&mut self, constraint: Constraint) -> Result<(), EngineError> {
        self.model.add_constraint(constraint)
    }

    fn evaluator(&mut self, evaluator: Arc<dyn CandidateEvaluator>) {
        self.model.set_evaluator(evaluator);
    }

    fn minimize(&mut self, tier: ObjectiveTier) {
        self.model.add_tier(tier);
    }

    fn solve(&mut self, budget: &Budget) -> Result<SolveReport, EngineError> {
        self.model.ensure_ready()?;
        self.search(budget)
            .map_err(|e| EngineError::Failed(e.to_string()))
    }

    fn sequence_value(&self, var: SequenceVar) -> Result<Vec<usize>, EngineError> {
        self.routes
            .get(var.id())
            .cloned()
            .ok_or(EngineError::UnknownVariable(var.id()))
    }
}
