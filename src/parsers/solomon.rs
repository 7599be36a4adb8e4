//! Solomon CVRPTW instances.
//!
//! ```text
//! C101
//!
//! VEHICLE
//! NUMBER     CAPACITY
//!   25         200
//!
//! CUSTOMER
//! CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME
//!
//!     0      40         50          0          0       1236          0
//!     1      45         68         10        912        967         90
//! ```
//!
//! The depot due date is the planning horizon. A customer's due date is its
//! latest *start*, so the latest end is `due + service`.

use std::io::{BufReader, Read};

use tracing::debug;

use super::text::{integer, parse_numbers, LineReader};
use crate::error::ModelError;
use crate::models::{Customer, Fleet, Instance, ProblemKind, TimeWindow};

/// Reads a Solomon CVRPTW instance.
pub trait SolomonProblem {
    /// Reads the instance with the fleet size given in the file.
    fn read_solomon(self) -> Result<Instance, ModelError>;
}

impl<R: Read> SolomonProblem for BufReader<R> {
    fn read_solomon(self) -> Result<Instance, ModelError> {
        read_solomon_format(self)
    }
}

impl SolomonProblem for String {
    fn read_solomon(self) -> Result<Instance, ModelError> {
        read_solomon_format(BufReader::new(self.as_bytes()))
    }
}

/// One customer row: `id x y demand ready due service`.
struct CustomerLine {
    id: usize,
    x: f64,
    y: f64,
    demand: i32,
    ready: f64,
    due: f64,
    service: f64,
}

fn read_solomon_format<R: Read>(reader: BufReader<R>) -> Result<Instance, ModelError> {
    let mut reader = LineReader::new(reader);

    reader.skip_lines(4)?;
    let line = reader.expect_data_line("vehicle number and capacity")?;
    let fleet_line: Vec<i64> = parse_numbers(line, 2, "vehicle line")?;
    let vehicles = usize::try_from(fleet_line[0])
        .map_err(|_| ModelError::malformed("negative vehicle number"))?;
    let capacity = i32::try_from(fleet_line[1])
        .map_err(|_| ModelError::malformed("capacity out of range"))?;

    reader.skip_lines(3)?;
    let depot = read_customer(&mut reader, "depot line")?;
    if depot.id != 0 || depot.demand != 0 {
        return Err(ModelError::malformed(format!(
            "depot line must have number 0 and demand 0, found {} and {}",
            depot.id, depot.demand
        )));
    }

    let mut customers = Vec::new();
    while let Some(line) = reader.next_data_line()? {
        let row = parse_customer(line, "customer line")?;
        let expected = customers.len() + 1;
        if row.id != expected {
            return Err(ModelError::malformed(format!(
                "unexpected customer number {} at line {}, expected {expected}",
                row.id,
                reader.line_no()
            )));
        }
        customers.push(to_customer(row, expected - 1)?);
    }
    debug!(
        customers = customers.len(),
        vehicles,
        capacity,
        horizon = depot.due,
        "solomon instance read"
    );

    Instance::new(
        ProblemKind::Cvrptw,
        (depot.x, depot.y),
        customers,
        Fleet::new(vehicles, capacity).with_horizon(depot.due),
    )
}

fn read_customer<R: Read>(reader: &mut LineReader<R>, what: &str) -> Result<CustomerLine, ModelError> {
    let line = reader.expect_data_line(what)?;
    parse_customer(line, what)
}

fn parse_customer(line: &str, what: &str) -> Result<CustomerLine, ModelError> {
    let v: Vec<f64> = parse_numbers(line, 7, what)?;
    Ok(CustomerLine {
        id: integer(v[0], "customer number")?,
        x: v[1],
        y: v[2],
        demand: integer(v[3], "demand")?,
        ready: v[4],
        due: v[5],
        service: v[6],
    })
}

fn to_customer(row: CustomerLine, index: usize) -> Result<Customer, ModelError> {
    let tw = TimeWindow::new(row.ready, row.due + row.service).ok_or_else(|| {
        ModelError::malformed(format!(
            "customer {} has ready time {} after due date {}",
            row.id, row.ready, row.due
        ))
    })?;
    Ok(Customer::new(index, row.x, row.y, row.demand)
        .with_time_window(tw)
        .with_service_duration(row.service))
}
