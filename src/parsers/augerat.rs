//! Augerat (TSPLIB-style) CVRP instances.
//!
//! ```text
//! NAME : A-n32-k5
//! DIMENSION : 32
//! EDGE_WEIGHT_TYPE : EUC_2D
//! CAPACITY : 100
//! NODE_COORD_SECTION
//!  1 82 76
//!  ...
//! DEMAND_SECTION
//!  1 0
//!  ...
//! DEPOT_SECTION
//!  1
//!  -1
//! EOF
//! ```
//!
//! Node 1 is the depot; node `k >= 2` becomes customer `k - 2`.

use std::io::{BufReader, Read};

use tracing::debug;

use super::text::Tokens;
use crate::error::ModelError;
use crate::models::{Customer, Fleet, Instance, ProblemKind};

/// Reads an Augerat CVRP instance.
///
/// The format carries no fleet size, so it is passed in (see
/// [`vehicles_from_file_name`](super::vehicles_from_file_name)).
pub trait AugeratProblem {
    /// Reads the instance for a fleet of `vehicles` trucks.
    fn read_augerat(self, vehicles: usize) -> Result<Instance, ModelError>;
}

impl<R: Read> AugeratProblem for BufReader<R> {
    fn read_augerat(mut self, vehicles: usize) -> Result<Instance, ModelError> {
        let mut text = String::new();
        self.read_to_string(&mut text)?;
        read_augerat_text(&text, vehicles)
    }
}

impl AugeratProblem for String {
    fn read_augerat(self, vehicles: usize) -> Result<Instance, ModelError> {
        read_augerat_text(&self, vehicles)
    }
}

fn read_augerat_text(text: &str, vehicles: usize) -> Result<Instance, ModelError> {
    let mut tokens = Tokens::new(text);
    let mut dimension: Option<usize> = None;
    let mut capacity: Option<i32> = None;

    loop {
        let token = tokens.next_token("NODE_COORD_SECTION")?;
        match token.trim_end_matches(':') {
            "DIMENSION" => {
                let value = tokens.header_value("DIMENSION")?;
                dimension = Some(parse_header(value, "DIMENSION")?);
            }
            "CAPACITY" => {
                let value = tokens.header_value("CAPACITY")?;
                capacity = Some(parse_header(value, "CAPACITY")?);
            }
            "EDGE_WEIGHT_TYPE" => {
                let value = tokens.header_value("EDGE_WEIGHT_TYPE")?;
                if value != "EUC_2D" {
                    return Err(ModelError::malformed(format!(
                        "edge weight type {value} is not supported (only EUC_2D)"
                    )));
                }
            }
            "NODE_COORD_SECTION" => break,
            _ => {}
        }
    }

    let nodes = dimension.ok_or_else(|| ModelError::malformed("missing DIMENSION"))?;
    let capacity = capacity.ok_or_else(|| ModelError::malformed("missing CAPACITY"))?;
    if nodes < 2 {
        return Err(ModelError::malformed(format!(
            "DIMENSION {nodes} leaves no customer"
        )));
    }

    let mut depot = (0.0, 0.0);
    let mut coords = Vec::with_capacity(nodes - 1);
    for n in 1..=nodes {
        expect_node(&mut tokens, n)?;
        let x: f64 = tokens.parse("x coordinate")?;
        let y: f64 = tokens.parse("y coordinate")?;
        if n == 1 {
            depot = (x, y);
        } else {
            coords.push((x, y));
        }
    }

    tokens.expect("DEMAND_SECTION")?;
    let mut demands = Vec::with_capacity(nodes - 1);
    for n in 1..=nodes {
        expect_node(&mut tokens, n)?;
        let demand: i32 = tokens.parse("demand")?;
        if n == 1 {
            if demand != 0 {
                return Err(ModelError::malformed(format!(
                    "depot demand should be 0, found {demand}"
                )));
            }
        } else {
            demands.push(demand);
        }
    }

    tokens.expect("DEPOT_SECTION")?;
    let depot_id: i64 = tokens.parse("depot id")?;
    if depot_id != 1 {
        return Err(ModelError::malformed(format!(
            "depot id is supposed to be 1, found {depot_id}"
        )));
    }
    let terminator: i64 = tokens.parse("DEPOT_SECTION terminator")?;
    if terminator != -1 {
        return Err(ModelError::malformed(
            "expecting only one depot, more than one found",
        ));
    }

    let customers = coords
        .into_iter()
        .zip(demands)
        .enumerate()
        .map(|(id, ((x, y), demand))| Customer::new(id, x, y, demand))
        .collect::<Vec<_>>();
    debug!(customers = customers.len(), capacity, "augerat instance read");

    Instance::new(
        ProblemKind::Cvrp,
        depot,
        customers,
        Fleet::new(vehicles, capacity),
    )
}

fn parse_header<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ModelError> {
    value
        .parse()
        .map_err(|_| ModelError::malformed(format!("cannot parse {key} value '{value}'")))
}

fn expect_node(tokens: &mut Tokens<'_>, expected: usize) -> Result<(), ModelError> {
    let id: usize = tokens.parse("node id")?;
    if id != expected {
        return Err(ModelError::malformed(format!(
            "unexpected node index {id}, expected {expected}"
        )));
    }
    Ok(())
}
