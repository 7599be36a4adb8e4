//! Cumulative route evaluator: load, timing and lateness recurrences.

use crate::error::ModelError;
use crate::models::{Instance, RouteAggregate, RouteSummary, Visit};

/// Folds the order-dependent recurrences of a routing instance over a
/// candidate sequence.
///
/// For a sequence `s[0..c]`:
///
/// ```text
/// load[i] = load[i-1] + demand[s[i]]
/// end[0]  = max(earliest[s[0]], depot[s[0]]) + service[s[0]]
/// end[i]  = max(earliest[s[i]], end[i-1] + d(s[i-1], s[i])) + service[s[i]]
/// late[i] = max(0, end[i] - latest_end[s[i]])
/// home    = max(0, end[c-1] + depot[s[c-1]] - horizon)
/// ```
///
/// The evaluator only reads the shared instance, so one value can serve
/// concurrent evaluations of different sequences.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::{Customer, Fleet, Instance, ProblemKind};
/// use u_routing_model::evaluation::RouteEvaluator;
///
/// let customers = vec![
///     Customer::new(0, 3.0, 4.0, 10),
///     Customer::new(1, 6.0, 8.0, 20),
/// ];
/// let instance = Instance::new(ProblemKind::Cvrp, (0.0, 0.0), customers, Fleet::new(1, 100))
///     .unwrap();
///
/// let evaluator = RouteEvaluator::new(&instance);
/// let route = evaluator.evaluate(&[0, 1]).unwrap();
/// assert_eq!(route.loads(), vec![10, 30]);
/// assert_eq!(route.distance(), 20.0);
/// assert!(route.is_used());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    instance: &'a Instance,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator over the given instance.
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Instance this evaluator reads.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Computes the full per-position aggregate of a sequence.
    ///
    /// # Errors
    ///
    /// `EvaluationDomain` if the sequence references an unknown customer.
    pub fn evaluate(&self, sequence: &[usize]) -> Result<RouteAggregate, ModelError> {
        let mut visits = Vec::with_capacity(sequence.len());
        let (distance, home_lateness) = self.fold(sequence, |visit| visits.push(visit))?;
        Ok(RouteAggregate::new(visits, distance, home_lateness))
    }

    /// Computes route totals in a single pass without allocating.
    ///
    /// Yields the same totals as [`evaluate`](Self::evaluate).
    pub fn summarize(&self, sequence: &[usize]) -> Result<RouteSummary, ModelError> {
        let mut max_load = i32::MIN;
        let mut lateness = 0.0;
        let (distance, home_lateness) = self.fold(sequence, |visit| {
            max_load = max_load.max(visit.load_after);
            lateness += visit.lateness;
        })?;
        Ok(RouteSummary {
            max_load: if sequence.is_empty() { 0 } else { max_load },
            lateness: home_lateness + lateness,
            distance,
            used: !sequence.is_empty(),
        })
    }

    /// Maximum prefix load of a sequence.
    pub fn max_load(&self, sequence: &[usize]) -> Result<i32, ModelError> {
        self.check_domain(sequence)?;
        let mut load = 0;
        let mut max_load = 0;
        for (i, &cid) in sequence.iter().enumerate() {
            load += self.instance.customer(cid).demand();
            max_load = if i == 0 { load } else { max_load.max(load) };
        }
        Ok(max_load)
    }

    /// Returns `true` if the maximum prefix load fits the vehicle capacity.
    pub fn is_capacity_feasible(&self, sequence: &[usize]) -> Result<bool, ModelError> {
        Ok(self.max_load(sequence)? <= self.instance.fleet().capacity())
    }

    fn check_domain(&self, sequence: &[usize]) -> Result<(), ModelError> {
        let n = self.instance.num_customers();
        match sequence.iter().find(|&&cid| cid >= n) {
            Some(&index) => Err(ModelError::EvaluationDomain {
                index,
                num_customers: n,
            }),
            None => Ok(()),
        }
    }

    /// Runs the recurrences, handing each visit to `on_visit`.
    ///
    /// Returns `(distance, home_lateness)`.
    fn fold<F: FnMut(Visit)>(
        &self,
        sequence: &[usize],
        mut on_visit: F,
    ) -> Result<(f64, f64), ModelError> {
        self.check_domain(sequence)?;
        let (Some(&first), Some(&last)) = (sequence.first(), sequence.last()) else {
            return Ok((0.0, 0.0));
        };

        let distances = self.instance.distances();
        let mut load = 0;
        let mut end = 0.0;
        let mut distance = distances.depot(first);
        let mut prev: Option<usize> = None;

        for &cid in sequence {
            let customer = self.instance.customer(cid);
            let arrival = match prev {
                None => distances.depot(cid),
                Some(p) => {
                    let hop = distances.get(p, cid);
                    distance += hop;
                    end + hop
                }
            };
            let tw = customer.time_window();
            end = tw.service_start(arrival) + customer.service_duration();
            load += customer.demand();

            on_visit(Visit {
                customer_id: cid,
                load_after: load,
                end_time: end,
                lateness: tw.lateness(end),
            });
            prev = Some(cid);
        }

        let back = distances.depot(last);
        distance += back;
        let home_lateness = self.instance.fleet().home_lateness(end + back);
        Ok((distance, home_lateness))
    }
}
