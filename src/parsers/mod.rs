//! Instance readers for the three benchmark families.
//!
//! - [`AugeratProblem`]: CVRP, Augerat/TSPLIB format
//! - [`SolomonProblem`]: CVRPTW, Solomon format
//! - [`LilimProblem`]: PDPTW, Li & Lim format
//!
//! Each trait is implemented for `BufReader<R>` and `String`.

mod augerat;
mod lilim;
mod solomon;
mod text;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::error::ModelError;
use crate::models::{Instance, ProblemKind};

pub use augerat::AugeratProblem;
pub use lilim::LilimProblem;
pub use solomon::SolomonProblem;

/// Extracts the fleet size from an Augerat file name such as
/// `A-n32-k5.vrp`.
///
/// # Examples
///
/// ```
/// use u_routing_model::parsers::vehicles_from_file_name;
///
/// assert_eq!(vehicles_from_file_name("data/A-n32-k5.vrp"), Some(5));
/// assert_eq!(vehicles_from_file_name("P-n101-k4"), Some(4));
/// assert_eq!(vehicles_from_file_name("c101.txt"), None);
/// ```
pub fn vehicles_from_file_name(name: &str) -> Option<usize> {
    let begin = name.rfind("-k")? + 2;
    let rest = &name[begin..];
    let end = rest.find('.').unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Reads an instance file of the given family.
///
/// `vehicles` overrides the fleet size; for CVRP it falls back to the
/// `-kN` suffix of the file name.
pub fn read_instance(
    kind: ProblemKind,
    path: &Path,
    vehicles: Option<usize>,
) -> Result<Instance, ModelError> {
    let reader = BufReader::new(File::open(path)?);
    let instance = match kind {
        ProblemKind::Cvrp => {
            let name = path.to_string_lossy();
            let count = vehicles.or_else(|| vehicles_from_file_name(&name)).ok_or_else(|| {
                ModelError::malformed(format!(
                    "vehicle count could not be read from the file name '{name}', give it explicitly"
                ))
            })?;
            reader.read_augerat(count)?
        }
        ProblemKind::Cvrptw => override_vehicles(reader.read_solomon()?, vehicles)?,
        ProblemKind::Pdptw => override_vehicles(reader.read_lilim()?, vehicles)?,
    };
    info!(
        path = %path.display(),
        kind = ?instance.kind(),
        customers = instance.num_customers(),
        vehicles = instance.fleet().vehicles(),
        "instance loaded"
    );
    Ok(instance)
}

fn override_vehicles(instance: Instance, vehicles: Option<usize>) -> Result<Instance, ModelError> {
    match vehicles {
        Some(n) => instance.with_vehicles(n),
        None => Ok(instance),
    }
}
