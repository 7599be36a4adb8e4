//! Bookkeeping of everything a model declared on an engine.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::{CandidateEvaluator, Constraint, SequenceVar};
use crate::distance::round_to_decimals;
use crate::error::{EngineError, ModelError};
use crate::evaluation::ObjectiveTier;
use crate::models::RouteSummary;

/// Hard-violation measure followed by the tier values, compared
/// lexicographically.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Score {
    /// Capacity excess plus broken pair constraints plus partition errors.
    pub hard: f64,
    /// Tier values in registration order.
    pub tiers: Vec<f64>,
}

impl Score {
    /// Returns `true` if no hard constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.hard == 0.0
    }

    /// Hard measure first, then each tier in order.
    pub fn lex_cmp(&self, other: &Score) -> Ordering {
        self.hard.total_cmp(&other.hard).then_with(|| {
            self.tiers
                .iter()
                .zip(&other.tiers)
                .map(|(a, b)| a.total_cmp(b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

/// Per-route part of a [`Score`], cached by engines between moves.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteScore {
    /// Output of the registered route fold.
    pub summary: RouteSummary,
    /// `max(0, max_load - limit)` for a capacity-constrained route.
    pub capacity_excess: i64,
    /// Pair members missing their partner in this route, plus deliveries
    /// placed before their pickup.
    pub pair_breaks: usize,
}

impl RouteScore {
    /// Hard-violation contribution of this route.
    pub fn hard(&self) -> f64 {
        self.capacity_excess as f64 + self.pair_breaks as f64
    }
}

/// Sequence variables, constraints, route fold and tiers declared so far.
#[derive(Clone, Default)]
pub struct DeclaredModel {
    domains: Vec<usize>,
    partitions: Vec<Vec<SequenceVar>>,
    capacity: Vec<Option<i32>>,
    same_route: Vec<Option<usize>>,
    pickup_of: Vec<Option<usize>>,
    tiers: Vec<ObjectiveTier>,
    evaluator: Option<Arc<dyn CandidateEvaluator>>,
}

impl DeclaredModel {
    /// Declares a new list variable.
    pub fn list_var(&mut self, domain: usize) -> SequenceVar {
        let var = SequenceVar::new(self.domains.len());
        self.domains.push(domain);
        self.capacity.push(None);
        let max = self.domain();
        if self.same_route.len() < max {
            self.same_route.resize(max, None);
            self.pickup_of.resize(max, None);
        }
        var
    }

    /// Registers a constraint after checking its handles and values.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), EngineError> {
        match constraint {
            Constraint::Partition(vars) => {
                for v in &vars {
                    self.check_var(*v)?;
                }
                self.partitions.push(vars);
            }
            Constraint::Capacity { var, limit } => {
                self.check_var(var)?;
                self.capacity[var.id()] = Some(limit);
            }
            Constraint::SameRoute { pickup, delivery } => {
                self.check_value(pickup)?;
                self.check_value(delivery)?;
                self.same_route[pickup] = Some(delivery);
                self.same_route[delivery] = Some(pickup);
            }
            Constraint::Precedes { pickup, delivery } => {
                self.check_value(pickup)?;
                self.check_value(delivery)?;
                self.pickup_of[delivery] = Some(pickup);
            }
        }
        Ok(())
    }

    fn check_var(&self, var: SequenceVar) -> Result<(), EngineError> {
        if var.id() >= self.domains.len() {
            return Err(EngineError::UnknownVariable(var.id()));
        }
        Ok(())
    }

    fn check_value(&self, value: usize) -> Result<(), EngineError> {
        if value >= self.domain() {
            return Err(EngineError::Failed(format!(
                "value {value} is outside every declared domain"
            )));
        }
        Ok(())
    }

    /// Registers the route fold.
    pub fn set_evaluator(&mut self, evaluator: Arc<dyn CandidateEvaluator>) {
        self.evaluator = Some(evaluator);
    }

    /// Appends a minimization tier.
    pub fn add_tier(&mut self, tier: ObjectiveTier) {
        self.tiers.push(tier);
    }

    /// Fails unless variables and a route fold have been declared.
    pub fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.domains.is_empty() {
            return Err(EngineError::EmptyModel);
        }
        if self.evaluator.is_none() {
            return Err(EngineError::MissingEvaluator);
        }
        Ok(())
    }

    /// Number of declared variables.
    pub fn num_vars(&self) -> usize {
        self.domains.len()
    }

    /// Largest declared domain.
    pub fn domain(&self) -> usize {
        self.domains.iter().copied().max().unwrap_or(0)
    }

    /// Registered tiers in priority order.
    pub fn tiers(&self) -> &[ObjectiveTier] {
        &self.tiers
    }

    /// Variables of the first partition constraint, if any.
    pub fn partition(&self) -> Option<&[SequenceVar]> {
        self.partitions.first().map(|p| p.as_slice())
    }

    /// Partner that must share the route of `value`.
    pub fn same_route_partner(&self, value: usize) -> Option<usize> {
        self.same_route.get(value).copied().flatten()
    }

    /// Pickup that must precede `value`.
    pub fn pickup_of(&self, value: usize) -> Option<usize> {
        self.pickup_of.get(value).copied().flatten()
    }

    /// Runs the route fold and the per-route hard checks of variable `var`.
    pub fn route_score(&self, var: usize, sequence: &[usize]) -> Result<RouteScore, ModelError> {
        let summary = match &self.evaluator {
            Some(evaluator) => evaluator.evaluate_route(sequence)?,
            None => RouteSummary::default(),
        };
        let capacity_excess = self
            .capacity
            .get(var)
            .copied()
            .flatten()
            .map(|limit| (i64::from(summary.max_load) - i64::from(limit)).max(0))
            .unwrap_or(0);

        // first position of every value, so each pair check is a lookup
        let mut first_pos: HashMap<usize, usize> = HashMap::with_capacity(sequence.len());
        for (pos, &value) in sequence.iter().enumerate() {
            first_pos.entry(value).or_insert(pos);
        }

        let mut pair_breaks = 0;
        for (pos, &value) in sequence.iter().enumerate() {
            if let Some(partner) = self.same_route_partner(value) {
                if !first_pos.contains_key(&partner) {
                    pair_breaks += 1;
                }
            }
            if let Some(pickup) = self.pickup_of(value) {
                if first_pos.get(&pickup).is_some_and(|&pickup_pos| pickup_pos > pos) {
                    pair_breaks += 1;
                }
            }
        }

        Ok(RouteScore {
            summary,
            capacity_excess,
            pair_breaks,
        })
    }

    /// Missing, duplicated or out-of-domain values over every partition.
    pub fn partition_errors(&self, routes: &[Vec<usize>]) -> usize {
        let domain = self.domain();
        let mut errors = 0;
        for vars in &self.partitions {
            let mut seen = vec![0usize; domain];
            for var in vars {
                for &value in routes.get(var.id()).map(Vec::as_slice).unwrap_or(&[]) {
                    match seen.get_mut(value) {
                        Some(count) => *count += 1,
                        None => errors += 1,
                    }
                }
            }
            errors += seen.iter().filter(|&&c| c != 1).count();
        }
        errors
    }

    /// Unrounded contribution of one route to a tier.
    pub fn tier_value(tier: &ObjectiveTier, summary: &RouteSummary) -> f64 {
        match tier {
            ObjectiveTier::TotalLateness => summary.lateness,
            ObjectiveTier::VehiclesUsed => f64::from(u8::from(summary.used)),
            ObjectiveTier::TotalDistance { .. } => summary.distance,
        }
    }

    /// Compares the change `before_a -> after_a` against `before_b -> after_b`
    /// lexicographically: hard measure first, then every tier.
    pub fn delta_cmp(
        &self,
        (before_a, after_a): (&RouteScore, &RouteScore),
        (before_b, after_b): (&RouteScore, &RouteScore),
    ) -> Ordering {
        let hard_a = after_a.hard() - before_a.hard();
        let hard_b = after_b.hard() - before_b.hard();
        hard_a.total_cmp(&hard_b).then_with(|| {
            self.tiers
                .iter()
                .map(|tier| {
                    let da = Self::tier_value(tier, &after_a.summary)
                        - Self::tier_value(tier, &before_a.summary);
                    let db = Self::tier_value(tier, &after_b.summary)
                        - Self::tier_value(tier, &before_b.summary);
                    da.total_cmp(&db)
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Combines cached route scores into a full score.
    pub fn combine(&self, routes: &[RouteScore], partition_errors: usize) -> Score {
        let hard = routes.iter().map(RouteScore::hard).sum::<f64>() + partition_errors as f64;
        let tiers = self
            .tiers
            .iter()
            .map(|tier| {
                let total: f64 = routes
                    .iter()
                    .map(|r| Self::tier_value(tier, &r.summary))
                    .sum();
                match tier {
                    ObjectiveTier::TotalDistance {
                        decimals: Some(d),
                    } => round_to_decimals(total, *d),
                    _ => total,
                }
            })
            .collect();
        Score { hard, tiers }
    }

    /// Scores a full assignment, one sequence per declared variable.
    pub fn score(&self, routes: &[Vec<usize>]) -> Result<Score, ModelError> {
        let route_scores = routes
            .iter()
            .enumerate()
            .map(|(var, seq)| self.route_score(var, seq))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.combine(&route_scores, self.partition_errors(routes)))
    }
}
