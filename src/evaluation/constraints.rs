//! Hard-constraint checks over a complete assignment.
//!
//! The engine enforces these while searching; the checks here validate an
//! assignment after the fact and report every breach found.

use crate::error::ModelError;
use crate::models::{Instance, Solution, Violation, ViolationType};

use super::RouteEvaluator;

/// Checks that the routes cover every customer `0..num_customers` exactly
/// once.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::Solution;
/// use u_routing_model::evaluation::check_partition;
///
/// let ok = Solution::new(vec![vec![0, 2], vec![1]]);
/// assert!(check_partition(&ok, 3).is_empty());
///
/// let broken = Solution::new(vec![vec![0, 0], vec![]]);
/// assert_eq!(check_partition(&broken, 2).len(), 2); // duplicate 0, missing 1
/// ```
pub fn check_partition(solution: &Solution, num_customers: usize) -> Vec<Violation> {
    let mut seen = vec![0usize; num_customers];
    let mut violations = Vec::new();

    for &cid in solution.routes().iter().flatten() {
        match seen.get_mut(cid) {
            Some(count) => *count += 1,
            None => violations.push(Violation::new(ViolationType::UnknownCustomer {
                customer_id: cid,
            })),
        }
    }

    for (cid, &count) in seen.iter().enumerate() {
        if count == 0 {
            violations.push(Violation::new(ViolationType::MissingCustomer {
                customer_id: cid,
            }));
        } else if count > 1 {
            violations.push(Violation::new(ViolationType::DuplicateCustomer {
                customer_id: cid,
            }));
        }
    }
    violations
}

/// Checks the maximum prefix load of every route against the capacity.
pub fn check_capacity(instance: &Instance, solution: &Solution) -> Result<Vec<Violation>, ModelError> {
    let evaluator = RouteEvaluator::new(instance);
    let capacity = instance.fleet().capacity();
    let mut violations = Vec::new();
    for (route_index, seq) in solution.routes().iter().enumerate() {
        let load = evaluator.max_load(seq)?;
        if load > capacity {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                route_index,
                load,
                capacity,
            }));
        }
    }
    Ok(violations)
}

/// Checks every pickup/delivery pair: same route, pickup not after delivery.
///
/// Unvisited members are left to [`check_partition`].
pub fn check_precedence(instance: &Instance, solution: &Solution) -> Vec<Violation> {
    let mut location = vec![None; instance.num_customers()];
    for (r, seq) in solution.routes().iter().enumerate() {
        for (pos, &cid) in seq.iter().enumerate() {
            if let Some(slot) = location.get_mut(cid) {
                slot.get_or_insert((r, pos));
            }
        }
    }

    let mut violations = Vec::new();
    for (pickup, delivery) in instance.pairs() {
        let (Some((rp, pp)), Some((rd, pd))) = (location[pickup], location[delivery]) else {
            continue;
        };
        if rp != rd {
            violations.push(Violation::new(ViolationType::PairSplit { pickup, delivery }));
        } else if pp > pd {
            violations.push(Violation::new(ViolationType::PrecedenceBroken {
                route_index: rp,
                pickup,
                delivery,
            }));
        }
    }
    violations
}

/// Runs the partition, capacity and precedence checks.
///
/// Capacity is skipped when `enforce_capacity` is false (penalized mode).
pub fn check_all(
    instance: &Instance,
    solution: &Solution,
    enforce_capacity: bool,
) -> Result<Vec<Violation>, ModelError> {
    let mut violations = check_partition(solution, instance.num_customers());
    if violations
        .iter()
        .any(|v| matches!(v.kind, ViolationType::UnknownCustomer { .. }))
    {
        return Ok(violations);
    }
    if enforce_capacity {
        violations.extend(check_capacity(instance, solution)?);
    }
    violations.extend(check_precedence(instance, solution));
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, Fleet, Pairing, ProblemKind};

    fn pdptw_instance() -> Instance {
        let customers = vec![
            Customer::new(0, 1.0, 0.0, 5).with_pairing(Pairing::Pickup { delivery: 1 }),
            Customer::new(1, 2.0, 0.0, -5).with_pairing(Pairing::Delivery { pickup: 0 }),
            Customer::new(2, 3.0, 0.0, 7).with_pairing(Pairing::Pickup { delivery: 3 }),
            Customer::new(3, 4.0, 0.0, -7).with_pairing(Pairing::Delivery { pickup: 2 }),
        ];
        Instance::new(ProblemKind::Pdptw, (0.0, 0.0), customers, Fleet::new(2, 10))
            .expect("valid")
    }

    #[test]
    fn test_partition_ok() {
        let sol = Solution::new(vec![vec![3, 1], vec![], vec![0, 2]]);
        assert!(check_partition(&sol, 4).is_empty());
    }

    #[test]
    fn test_partition_unknown() {
        let sol = Solution::new(vec![vec![0, 7]]);
        let v = check_partition(&sol, 1);
        assert_eq!(
            v,
            vec![Violation::new(ViolationType::UnknownCustomer { customer_id: 7 })]
        );
    }

    #[test]
    fn test_precedence_ok() {
        let inst = pdptw_instance();
        let sol = Solution::new(vec![vec![0, 2, 1, 3], vec![]]);
        assert!(check_precedence(&inst, &sol).is_empty());
    }

    #[test]
    fn test_precedence_broken() {
        let inst = pdptw_instance();
        let sol = Solution::new(vec![vec![1, 0], vec![2, 3]]);
        let v = check_precedence(&inst, &sol);
        assert_eq!(
            v,
            vec![Violation::new(ViolationType::PrecedenceBroken {
                route_index: 0,
                pickup: 0,
                delivery: 1,
            })]
        );
    }

    #[test]
    fn test_pair_split() {
        let inst = pdptw_instance();
        let sol = Solution::new(vec![vec![0, 3], vec![2, 1]]);
        let v = check_precedence(&inst, &sol);
        assert_eq!(v.len(), 2);
        assert!(v
            .iter()
            .all(|x| matches!(x.kind, ViolationType::PairSplit { .. })));
    }

    #[test]
    fn test_capacity_on_prefix() {
        let inst = pdptw_instance();
        // loads: 5, 12 -> exceeds 10 before deliveries
        let sol = Solution::new(vec![vec![0, 2, 1, 3], vec![]]);
        let v = check_capacity(&inst, &sol).expect("valid");
        assert_eq!(
            v,
            vec![Violation::new(ViolationType::CapacityExceeded {
                route_index: 0,
                load: 12,
                capacity: 10,
            })]
        );
        let sol = Solution::new(vec![vec![0, 1, 2, 3], vec![]]);
        assert!(check_capacity(&inst, &sol).expect("valid").is_empty());
    }

    #[test]
    fn test_check_all() {
        let inst = pdptw_instance();
        let sol = Solution::new(vec![vec![0, 2, 1, 3], vec![]]);
        assert_eq!(check_all(&inst, &sol, true).expect("valid").len(), 1);
        assert!(check_all(&inst, &sol, false).expect("valid").is_empty());
        let sol = Solution::new(vec![vec![0, 9]]);
        assert!(check_all(&inst, &sol, true).expect("valid").len() >= 1);
    }
}
