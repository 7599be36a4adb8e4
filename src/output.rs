//! Solution files: the plain-text benchmark format and a JSON report.
//!
//! Text format:
//!
//! ```text
//! <vehicles used> <total distance>
//! <customer> <customer> ...      one line per used route
//! ```
//!
//! Customer indices are shifted by the configured offset (2 for the
//! benchmark files, where node 1 is the depot).

use std::io::Write;

use serde::Serialize;

use crate::engine::SolveStatus;
use crate::model::Evaluation;
use crate::models::{ProblemKind, Solution, Violation};

/// Writes the plain-text solution.
///
/// The distance is printed as an integer for CVRP and with two decimals
/// for the time-window families.
///
/// # Examples
///
/// ```
/// use u_routing_model::evaluation::Objective;
/// use u_routing_model::model::Evaluation;
/// use u_routing_model::models::{ProblemKind, Solution};
/// use u_routing_model::output::write_solution;
///
/// let solution = Solution::new(vec![vec![0, 2], vec![], vec![1]]);
/// let evaluation = Evaluation {
///     routes: Vec::new(),
///     objective: Objective { lateness: 0.0, vehicles_used: 2, distance: 123.456 },
///     violations: Vec::new(),
/// };
/// let mut out = Vec::new();
/// write_solution(&mut out, ProblemKind::Cvrptw, &solution, &evaluation, 2).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "2 123.46\n2 4\n3\n");
/// ```
pub fn write_solution<W: Write>(
    writer: &mut W,
    kind: ProblemKind,
    solution: &Solution,
    evaluation: &Evaluation,
    offset: usize,
) -> std::io::Result<()> {
    let objective = &evaluation.objective;
    match kind.distance_decimals() {
        Some(d) => writeln!(
            writer,
            "{} {:.*}",
            objective.vehicles_used,
            d as usize,
            objective.distance
        )?,
        None => writeln!(
            writer,
            "{} {}",
            objective.vehicles_used,
            objective.distance.round() as i64
        )?,
    }
    for route in solution.routes().iter().filter(|r| !r.is_empty()) {
        let line = route
            .iter()
            .map(|c| (c + offset).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Machine-readable summary of a solve.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionReport {
    /// Problem family.
    pub kind: ProblemKind,
    /// Feasibility reported by the engine.
    pub status: SolveStatus,
    /// Total lateness (zero at a time-feasible solution).
    pub total_lateness: f64,
    /// Number of used routes.
    pub vehicles_used: usize,
    /// Total distance, rounded as in the objective.
    pub total_distance: f64,
    /// Used routes with offset customer indices.
    pub routes: Vec<Vec<usize>>,
    /// Hard-constraint violations found when re-checking the assignment.
    pub violations: Vec<Violation>,
    /// Moves evaluated by the engine.
    pub iterations: u64,
}

impl SolutionReport {
    /// Builds the report from an evaluated solution.
    pub fn new(
        kind: ProblemKind,
        status: SolveStatus,
        solution: &Solution,
        evaluation: &Evaluation,
        offset: usize,
        iterations: u64,
    ) -> Self {
        Self {
            kind,
            status,
            total_lateness: evaluation.objective.lateness,
            vehicles_used: evaluation.objective.vehicles_used,
            total_distance: evaluation.objective.distance,
            routes: solution
                .routes()
                .iter()
                .filter(|r| !r.is_empty())
                .map(|r| r.iter().map(|c| c + offset).collect())
                .collect(),
            violations: evaluation.violations.clone(),
            iterations,
        }
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Objective;

    fn evaluation(distance: f64) -> Evaluation {
        Evaluation {
            routes: Vec::new(),
            objective: Objective {
                lateness: 0.0,
                vehicles_used: 2,
                distance,
            },
            violations: Vec::new(),
        }
    }

    #[test]
    fn test_cvrp_integer_distance() {
        let solution = Solution::new(vec![vec![1, 0], vec![2]]);
        let mut out = Vec::new();
        write_solution(&mut out, ProblemKind::Cvrp, &solution, &evaluation(784.0), 2)
            .expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "2 784\n3 2\n4\n");
    }

    #[test]
    fn test_offset_zero() {
        let solution = Solution::new(vec![vec![], vec![0, 1]]);
        let mut out = Vec::new();
        write_solution(&mut out, ProblemKind::Pdptw, &solution, &evaluation(10.0), 0)
            .expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "2 10.00\n0 1\n");
    }

    #[test]
    fn test_report_json() {
        let solution = Solution::new(vec![vec![0], vec![], vec![1]]);
        let report = SolutionReport::new(
            ProblemKind::Cvrptw,
            SolveStatus::Feasible,
            &solution,
            &evaluation(12.5),
            2,
            400,
        );
        assert_eq!(report.routes, vec![vec![2], vec![3]]);

        let mut out = Vec::new();
        report.write_json(&mut out).expect("json");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("parse");
        assert_eq!(value["kind"], "cvrptw");
        assert_eq!(value["status"], "feasible");
        assert_eq!(value["vehicles_used"], 2);
        assert_eq!(value["iterations"], 400);
    }
}
