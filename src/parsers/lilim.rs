//! Li & Lim PDPTW instances.
//!
//! ```text
//! 25	200	1
//! 0	40	50	0	0	1236	0	0	0
//! 1	45	68	-10	912	967	90	11	0
//! ...
//! 11	35	69	10	448	505	90	0	1
//! ```
//!
//! First line: vehicles, capacity, speed. Then the depot and one row per
//! task: `id x y demand ready due service pickup delivery`. A row whose
//! pickup column is 0 is a pickup and its delivery column names the paired
//! delivery; otherwise the row is a delivery of the named pickup.

use std::io::{BufReader, Read};

use tracing::{debug, warn};

use super::text::{integer, parse_numbers, LineReader};
use crate::error::ModelError;
use crate::models::{Customer, Fleet, Instance, Pairing, ProblemKind, TimeWindow};

/// Reads a Li & Lim PDPTW instance.
pub trait LilimProblem {
    /// Reads the instance with the fleet size given in the file.
    fn read_lilim(self) -> Result<Instance, ModelError>;
}

impl<R: Read> LilimProblem for BufReader<R> {
    fn read_lilim(self) -> Result<Instance, ModelError> {
        read_lilim_format(self)
    }
}

impl LilimProblem for String {
    fn read_lilim(self) -> Result<Instance, ModelError> {
        read_lilim_format(BufReader::new(self.as_bytes()))
    }
}

fn read_lilim_format<R: Read>(reader: BufReader<R>) -> Result<Instance, ModelError> {
    let mut reader = LineReader::new(reader);

    let line = reader.expect_data_line("vehicle line")?;
    let header: Vec<f64> = parse_numbers(line, 3, "vehicle line")?;
    let vehicles: usize = integer(header[0], "vehicle number")?;
    let capacity: i32 = integer(header[1], "capacity")?;
    if header[2] != 1.0 {
        warn!(speed = header[2], "vehicle speed is ignored, travel time equals distance");
    }

    let line = reader.expect_data_line("depot line")?;
    let depot: Vec<f64> = parse_numbers(line, 9, "depot line")?;
    if depot[0] != 0.0 || depot[3] != 0.0 {
        return Err(ModelError::malformed(format!(
            "depot line must have number 0 and demand 0, found {} and {}",
            depot[0], depot[3]
        )));
    }
    let horizon = depot[5];

    let mut customers = Vec::new();
    while let Some(line) = reader.next_data_line()? {
        let v: Vec<f64> = parse_numbers(line, 9, "task line")?;
        let index = customers.len();
        if v[0] != (index + 1) as f64 {
            return Err(ModelError::malformed(format!(
                "unexpected task number {} at line {}, expected {}",
                v[0],
                reader.line_no(),
                index + 1
            )));
        }
        let (ready, due, service) = (v[4], v[5], v[6]);
        let tw = TimeWindow::new(ready, due + service).ok_or_else(|| {
            ModelError::malformed(format!(
                "task {} has ready time {ready} after due date {due}",
                index + 1
            ))
        })?;
        let mut customer = Customer::new(index, v[1], v[2], integer(v[3], "demand")?)
            .with_time_window(tw)
            .with_service_duration(service);
        let (pickup, delivery) = (integer(v[7], "pickup column")?, integer(v[8], "delivery column")?);
        if let Some(pairing) = pairing(pickup, delivery, index)? {
            customer = customer.with_pairing(pairing);
        }
        customers.push(customer);
    }
    debug!(
        tasks = customers.len(),
        vehicles,
        capacity,
        horizon,
        "li & lim instance read"
    );

    Instance::new(
        ProblemKind::Pdptw,
        (depot[1], depot[2]),
        customers,
        Fleet::new(vehicles, capacity).with_horizon(horizon),
    )
}

/// Converts the 1-based pickup/delivery columns of task `index`.
fn pairing(pickup: i64, delivery: i64, index: usize) -> Result<Option<Pairing>, ModelError> {
    let to_index = |column: i64| {
        usize::try_from(column - 1).map_err(|_| {
            ModelError::infeasible(format!(
                "task {} references invalid partner {column}",
                index + 1
            ))
        })
    };
    match (pickup, delivery) {
        (0, 0) => Ok(None),
        (0, d) => Ok(Some(Pairing::Pickup {
            delivery: to_index(d)?,
        })),
        (p, _) => Ok(Some(Pairing::Delivery {
            pickup: to_index(p)?,
        })),
    }
}
