//! Engine that assigns pre-set sequences instead of searching.

use std::sync::Arc;

use tracing::debug;

use super::{
    Budget, CandidateEvaluator, Constraint, DeclaredModel, Engine, SequenceVar, SolveReport,
    SolveStatus,
};
use crate::error::EngineError;
use crate::evaluation::ObjectiveTier;

/// Deterministic engine that hands back the sequences it was built with.
///
/// Variable `k` receives the `k`-th scripted sequence (or an empty one).
/// `solve` only scores the script against the declared model, which makes
/// this the stub for testing model construction without a real search.
///
/// # Examples
///
/// ```
/// use u_routing_model::engine::{Budget, Engine, ScriptedEngine};
///
/// let mut engine = ScriptedEngine::new(vec![vec![2, 0], vec![1]]);
/// let a = engine.list_var(3);
/// let b = engine.list_var(3);
/// assert_eq!(engine.sequence_value(a).unwrap(), vec![2, 0]);
/// assert_eq!(engine.sequence_value(b).unwrap(), vec![1]);
/// ```
#[derive(Clone)]
pub struct ScriptedEngine {
    script: Vec<Vec<usize>>,
    model: DeclaredModel,
}

impl ScriptedEngine {
    /// Creates an engine replaying the given sequences.
    pub fn new(script: Vec<Vec<usize>>) -> Self {
        Self {
            script,
            model: DeclaredModel::default(),
        }
    }

    /// Declarations received so far.
    pub fn model(&self) -> &DeclaredModel {
        &self.model
    }

    fn assignment(&self) -> Vec<Vec<usize>> {
        (0..self.model.num_vars())
            .map(|k| self.script.get(k).cloned().unwrap_or_default())
            .collect()
    }
}

impl Engine for ScriptedEngine {
    fn list_var(&mut self, domain: usize) -> SequenceVar {
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

    fn solve(&mut self, _budget: &Budget) -> Result<SolveReport, EngineError> {
        self.model.ensure_ready()?;
        let score = self
            .model
            .score(&self.assignment())
            .map_err(|e| EngineError::Failed(e.to_string()))?;
        debug!(hard = score.hard, tiers = ?score.tiers, "scripted assignment scored");
        let status = if score.is_feasible() {
            SolveStatus::Feasible
        } else {
            SolveStatus::Infeasible
        };
        Ok(SolveReport {
            status,
            score,
            iterations: 0,
        })
    }

    fn sequence_value(&self, var: SequenceVar) -> Result<Vec<usize>, EngineError> {
        if var.id() >= self.model.num_vars() {
            return Err(EngineError::UnknownVariable(var.id()));
        }
        Ok(self.script.get(var.id()).cloned().unwrap_or_default())
    }
}
