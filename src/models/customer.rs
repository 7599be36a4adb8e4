//! Customer, time window and pickup/delivery pairing types.

/// Time window of a customer visit.
///
/// `earliest` is the earliest service start; `latest_end` is the latest
/// allowed completion of the service. Finishing after `latest_end` is not
/// rejected, it is measured as lateness.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert_eq!(tw.earliest(), 100.0);
/// assert_eq!(tw.lateness(180.0), 0.0);
/// assert_eq!(tw.lateness(230.0), 30.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    earliest: f64,
    latest_end: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `earliest > latest_end`, if `earliest` is not finite,
    /// or if `latest_end` is NaN.
    pub fn new(earliest: f64, latest_end: f64) -> Option<Self> {
        if !earliest.is_finite() || latest_end.is_nan() || earliest > latest_end {
            return None;
        }
        Some(Self {
            earliest,
            latest_end,
        })
    }

    /// A window that never produces lateness (CVRP customers).
    pub fn unbounded() -> Self {
        Self {
            earliest: 0.0,
            latest_end: f64::INFINITY,
        }
    }

    /// Earliest service start.
    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    /// Latest allowed end of service.
    pub fn latest_end(&self) -> f64 {
        self.latest_end
    }

    /// Service start for a vehicle that can arrive at `arrival`.
    ///
    /// Waits when early; ties resolve to `earliest`.
    pub fn service_start(&self, arrival: f64) -> f64 {
        self.earliest.max(arrival)
    }

    /// Positive excess of `end` over the latest allowed end, else zero.
    pub fn lateness(&self, end: f64) -> f64 {
        (end - self.latest_end).max(0.0)
    }
}

/// Role of a customer in a pickup-and-delivery pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Pickup whose goods go to the given delivery customer.
    Pickup {
        /// Index of the paired delivery.
        delivery: usize,
    },
    /// Delivery of goods collected at the given pickup customer.
    Delivery {
        /// Index of the paired pickup.
        pickup: usize,
    },
}

impl Pairing {
    /// Index of the other customer in the pair.
    pub fn partner(&self) -> usize {
        match *self {
            Pairing::Pickup { delivery } => delivery,
            Pairing::Delivery { pickup } => pickup,
        }
    }
}

/// A customer (pickup or delivery location) in a routing instance.
///
/// Customers are indexed `0..n` in instance order; the depot is not a
/// customer and is stored on the instance.
///
/// # Examples
///
/// ```
/// use u_routing_model::models::{Customer, TimeWindow};
///
/// let c = Customer::new(0, 41.0, 49.0, 10)
///     .with_time_window(TimeWindow::new(161.0, 181.0).unwrap())
///     .with_service_duration(10.0);
/// assert_eq!(c.id(), 0);
/// assert_eq!(c.demand(), 10);
/// assert_eq!(c.service_duration(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    service_duration: f64,
    time_window: TimeWindow,
    pairing: Option<Pairing>,
}

impl Customer {
    /// Creates a customer with no time window, no service time and no pair.
    pub fn new(id: usize, x: f64, y: f64, demand: i32) -> Self {
        Self {
            id,
            x,
            y,
            demand,
            service_duration: 0.0,
            time_window: TimeWindow::unbounded(),
            pairing: None,
        }
    }

    /// Sets the time window.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = tw;
        self
    }

    /// Sets the service duration.
    pub fn with_service_duration(mut self, duration: f64) -> Self {
        self.service_duration = duration;
        self
    }

    /// Links this customer to its pickup/delivery partner.
    pub fn with_pairing(mut self, pairing: Pairing) -> Self {
        self.pairing = Some(pairing);
        self
    }

    /// 0-based customer index.
    pub fn id(&self) -> usize {
        self.id
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Signed demand (pickups positive, deliveries negative in Li&Lim files).
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Service duration.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Pickup/delivery link, if any.
    pub fn pairing(&self) -> Option<Pairing> {
        self.pairing
    }

    /// Euclidean distance to a point.
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean distance to another customer.
    pub fn distance_to(&self, other: &Customer) -> f64 {
        self.distance_to_point(other.x, other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(0.0, f64::NAN).is_none());
        assert!(TimeWindow::new(0.0, f64::INFINITY).is_some());
    }

    #[test]
    fn test_service_start_waits_when_early() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert_eq!(tw.service_start(4.0), 10.0);
        assert_eq!(tw.service_start(10.0), 10.0);
        assert_eq!(tw.service_start(12.5), 12.5);
    }

    #[test]
    fn test_lateness() {
        let tw = TimeWindow::new(0.0, 6.0).expect("valid");
        assert_eq!(tw.lateness(5.0), 0.0);
        assert_eq!(tw.lateness(6.0), 0.0);
        assert_eq!(tw.lateness(8.0), 2.0);
    }

    #[test]
    fn test_unbounded_never_late() {
        let tw = TimeWindow::unbounded();
        assert_eq!(tw.lateness(1e12), 0.0);
    }

    #[test]
    fn test_customer_defaults() {
        let c = Customer::new(3, 10.0, 20.0, -5);
        assert_eq!(c.id(), 3);
        assert_eq!(c.demand(), -5);
        assert_eq!(c.service_duration(), 0.0);
        assert!(c.pairing().is_none());
        assert_eq!(c.time_window().earliest(), 0.0);
    }

    #[test]
    fn test_pairing_partner() {
        assert_eq!(Pairing::Pickup { delivery: 4 }.partner(), 4);
        assert_eq!(Pairing::Delivery { pickup: 1 }.partner(), 1);
    }

    #[test]
    fn test_customer_distance() {
        let a = Customer::new(0, 0.0, 0.0, 0);
        let b = Customer::new(1, 3.0, 4.0, 0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((b.distance_to_point(0.0, 0.0) - 5.0).abs() < 1e-10);
    }
}
