//! Greedy cheapest-insertion construction.
//!
//! # Algorithm
//!
//! Customers are grouped into insertion units: a pickup/delivery pair that
//! must share a route is inserted as one unit, every other value on its own.
//! Each unit goes to the route and position(s) whose insertion changes the
//! route score the least, compared lexicographically (hard violations, then
//! each declared tier). Pairs try every `(i, j)` with the pickup before the
//! delivery.
//!
//! When the deadline passes, the remaining units are appended to the first
//! route that takes them without a new hard violation.
//!
//! # Complexity
//!
//! O(n × R × L) fold calls for singles, O(n × R × L²) for pairs, where R is
//! the number of routes and L the route length. Past the deadline, O(R) per
//! unit.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2), 254-265.

use std::cmp::Ordering;
use std::time::Instant;

use tracing::debug;

use crate::engine::{DeclaredModel, RouteScore};
use crate::error::ModelError;

/// Values inserted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Unit {
    Single(usize),
    /// `(first, second)`: `first` must be visited before `second`.
    Pair(usize, usize),
}

/// Groups `0..domain` into insertion units.
pub(super) fn insertion_units(model: &DeclaredModel) -> Vec<Unit> {
    let domain = model.domain();
    let mut handled = vec![false; domain];
    let mut units = Vec::with_capacity(domain);
    for v in 0..domain {
        if handled[v] {
            continue;
        }
        handled[v] = true;
        match model.same_route_partner(v) {
            Some(w) if w < domain && !handled[w] => {
                handled[w] = true;
                if model.pickup_of(v) == Some(w) {
                    units.push(Unit::Pair(w, v));
                } else {
                    units.push(Unit::Pair(v, w));
                }
            }
            _ => units.push(Unit::Single(v)),
        }
    }
    units
}

/// Inserts `unit` into `sequence` at `(i, j)`; `j` indexes the sequence
/// after the first insertion.
pub(super) fn insert_unit(sequence: &mut Vec<usize>, unit: Unit, i: usize, j: usize) {
    match unit {
        Unit::Single(v) => sequence.insert(i, v),
        Unit::Pair(first, second) => {
            sequence.insert(i, first);
            sequence.insert(j, second);
        }
    }
}

struct Candidate {
    slot: usize,
    i: usize,
    j: usize,
    after: RouteScore,
}

/// Builds an assignment over the given route slots (variable ids).
///
/// Returns one sequence per declared variable; variables not in `slots`
/// stay empty. Cheapest insertion stops at `deadline`.
pub(super) fn greedy_insertion(
    model: &DeclaredModel,
    slots: &[usize],
    deadline: Option<Instant>,
) -> Result<Vec<Vec<usize>>, ModelError> {
    let mut routes = vec![Vec::new(); model.num_vars()];
    let mut scores = slots
        .iter()
        .map(|&var| model.route_score(var, &[]))
        .collect::<Result<Vec<_>, _>>()?;
    let mut appended = 0usize;

    for unit in insertion_units(model) {
        let best = if deadline.is_some_and(|d| Instant::now() >= d) {
            appended += 1;
            first_fit(model, slots, &routes, &scores, unit)?
        } else {
            cheapest(model, slots, &routes, &scores, unit)?
        };
        if let Some(c) = best {
            insert_unit(&mut routes[slots[c.slot]], unit, c.i, c.j);
            scores[c.slot] = c.after;
        }
    }

    if appended > 0 {
        debug!(appended, "time limit reached during construction");
    }
    Ok(routes)
}

fn cheapest(
    model: &DeclaredModel,
    slots: &[usize],
    routes: &[Vec<usize>],
    scores: &[RouteScore],
    unit: Unit,
) -> Result<Option<Candidate>, ModelError> {
    let mut best: Option<Candidate> = None;
    let mut tried_empty = false;

    for (slot, &var) in slots.iter().enumerate() {
        let seq = &routes[var];
        // empty routes are interchangeable
        if seq.is_empty() {
            if tried_empty {
                continue;
            }
            tried_empty = true;
        }

        let len = seq.len();
        let positions: Vec<(usize, usize)> = match unit {
            Unit::Single(_) => (0..=len).map(|i| (i, 0)).collect(),
            Unit::Pair(..) => (0..=len)
                .flat_map(|i| ((i + 1)..=(len + 1)).map(move |j| (i, j)))
                .collect(),
        };

        for (i, j) in positions {
            let mut candidate = seq.clone();
            insert_unit(&mut candidate, unit, i, j);
            let after = model.route_score(var, &candidate)?;
            let is_better = best.as_ref().is_none_or(|b| {
                model.delta_cmp((&scores[slot], &after), (&scores[b.slot], &b.after))
                    == Ordering::Less
            });
            if is_better {
                best = Some(Candidate { slot, i, j, after });
            }
        }
    }
    Ok(best)
}

/// Appends `unit` to the first route whose hard violations do not grow,
/// falling back to the route where they grow the least.
fn first_fit(
    model: &DeclaredModel,
    slots: &[usize],
    routes: &[Vec<usize>],
    scores: &[RouteScore],
    unit: Unit,
) -> Result<Option<Candidate>, ModelError> {
    let mut best: Option<(f64, Candidate)> = None;
    for (slot, &var) in slots.iter().enumerate() {
        let len = routes[var].len();
        let mut candidate = routes[var].clone();
        insert_unit(&mut candidate, unit, len, len + 1);
        let after = model.route_score(var, &candidate)?;
        let growth = after.hard() - scores[slot].hard();
        if best.as_ref().is_none_or(|(g, _)| growth < *g) {
            best = Some((growth, Candidate { slot, i: len, j: len + 1, after }));
        }
        if growth <= 0.0 {
            break;
        }
    }
    Ok(best.map(|(_, c)| c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CandidateEvaluator, Constraint};
    use crate::evaluation::ObjectiveTier;
    use crate::models::RouteSummary;
    use std::sync::Arc;

    /// Points on a line at x = value; depot at 0.
    struct LineFold;

    impl CandidateEvaluator for LineFold {
        fn evaluate_route(&self, seq: &[usize]) -> Result<RouteSummary, ModelError> {
            let mut distance = 0.0;
            let mut prev = 0.0;
            for &v in seq {
                let x = (v + 1) as f64;
                distance += (x - prev).abs();
                prev = x;
            }
            distance += prev;
            Ok(RouteSummary {
                max_load: seq.len() as i32,
                lateness: 0.0,
                distance,
                used: !seq.is_empty(),
            })
        }
    }

    fn model(pairs: &[(usize, usize)], limit: i32) -> (DeclaredModel, Vec<usize>) {
        let mut m = DeclaredModel::default();
        let vars: Vec<_> = (0..3).map(|_| m.list_var(4)).collect();
        m.add_constraint(Constraint::Partition(vars.clone())).expect("valid");
        for &v in &vars {
            m.add_constraint(Constraint::Capacity { var: v, limit }).expect("valid");
        }
        for &(p, d) in pairs {
            m.add_constraint(Constraint::SameRoute {
                pickup: p,
                delivery: d,
            })
            .expect("valid");
            m.add_constraint(Constraint::Precedes {
                pickup: p,
                delivery: d,
            })
            .expect("valid");
        }
        m.set_evaluator(Arc::new(LineFold));
        m.add_tier(ObjectiveTier::VehiclesUsed);
        m.add_tier(ObjectiveTier::TotalDistance { decimals: None });
        (m, vars.iter().map(|v| v.id()).collect())
    }

    #[test]
    fn test_units() {
        let (m, _) = model(&[(3, 1)], 4);
        assert_eq!(
            insertion_units(&m),
            vec![Unit::Single(0), Unit::Pair(3, 1), Unit::Single(2)]
        );
    }

    #[test]
    fn test_greedy_covers_all() {
        let (m, slots) = model(&[], 4);
        let routes = greedy_insertion(&m, &slots, None).expect("valid");
        assert_eq!(m.partition_errors(&routes), 0);
        // everything fits one vehicle
        assert_eq!(routes.iter().filter(|r| !r.is_empty()).count(), 1);
    }

    #[test]
    fn test_greedy_respects_capacity() {
        let (m, slots) = model(&[], 2);
        let routes = greedy_insertion(&m, &slots, None).expect("valid");
        assert!(m.score(&routes).expect("valid").is_feasible());
        assert!(routes.iter().all(|r| r.len() <= 2));
    }

    #[test]
    fn test_greedy_keeps_pairs_ordered() {
        let (m, slots) = model(&[(3, 0)], 4);
        let routes = greedy_insertion(&m, &slots, None).expect("valid");
        let route = routes.iter().find(|r| r.contains(&3)).expect("placed");
        let p = route.iter().position(|&v| v == 3).expect("pickup");
        let d = route.iter().position(|&v| v == 0).expect("delivery");
        assert!(p < d);
    }

    #[test]
    fn test_expired_deadline_still_covers_all() {
        let (m, slots) = model(&[(3, 0)], 2);
        let routes = greedy_insertion(&m, &slots, Some(Instant::now())).expect("valid");
        assert_eq!(m.partition_errors(&routes), 0);
        assert!(m.score(&routes).expect("valid").is_feasible());
        let route = routes.iter().find(|r| r.contains(&3)).expect("placed");
        assert_eq!(route, &vec![3, 0]);
    }
}
