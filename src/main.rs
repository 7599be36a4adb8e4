use anyhow::{anyhow, Context, Result};
use clap::{arg, ArgMatches, Command};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};
use u_routing_model::config::SolveConfig;
use u_routing_model::engine::{Engine, LocalSearchEngine};
use u_routing_model::model::RoutingModel;
use u_routing_model::models::ProblemKind;
use u_routing_model::output::{write_solution, SolutionReport};
use u_routing_model::parsers::read_instance;

fn instance_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(<INSTANCE> "Path to the instance file").value_parser(clap::value_parser!(PathBuf)))
        .arg(
            arg!(-o --output <PATH> "Solution file (defaults to stdout)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-t --"time-limit" <SECS> "Wall-clock limit in seconds")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            arg!(--iterations <N> "Maximum number of evaluated moves")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(arg!(--seed <N> "Random seed").value_parser(clap::value_parser!(u64)))
        .arg(
            arg!(--vehicles <N> "Overrides the fleet size of the instance")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(arg!(--json "Writes a JSON report instead of the text format"))
        .arg(
            arg!(--config <PATH> "JSON solve configuration")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn cli() -> Command {
    Command::new("routing-model")
        .about("Models and solves CVRP, CVRPTW and PDPTW benchmark instances")
        .arg_required_else_help(true)
        .subcommand(instance_command("cvrp", "Capacitated VRP (Augerat format)"))
        .subcommand(instance_command("cvrptw", "CVRP with time windows (Solomon format)"))
        .subcommand(instance_command("pdptw", "Pickup and delivery with time windows (Li & Lim format)"))
}

fn main() {
    registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("cvrp", sub_m)) => solve(ProblemKind::Cvrp, sub_m),
        Some(("cvrptw", sub_m)) => solve(ProblemKind::Cvrptw, sub_m),
        Some(("pdptw", sub_m)) => solve(ProblemKind::Pdptw, sub_m),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(sub_m: &ArgMatches) -> Result<SolveConfig> {
    let mut config = match sub_m.get_one::<PathBuf>("config") {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SolveConfig::from_json(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => SolveConfig::default(),
    };
    if let Some(&secs) = sub_m.get_one::<f64>("time-limit") {
        config = config.with_time_limit(secs);
    }
    if let Some(&n) = sub_m.get_one::<u64>("iterations") {
        config = config.with_max_iterations(n);
    }
    if let Some(&seed) = sub_m.get_one::<u64>("seed") {
        config = config.with_seed(seed);
    }
    if let Some(&n) = sub_m.get_one::<usize>("vehicles") {
        config = config.with_vehicles(n);
    }
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {e}"))?;
    Ok(config)
}

fn solve(kind: ProblemKind, sub_m: &ArgMatches) -> Result<()> {
    let config = load_config(sub_m)?;
    let path = sub_m
        .get_one::<PathBuf>("INSTANCE")
        .ok_or_else(|| anyhow!("Missing instance path"))?;

    let instance = read_instance(kind, path, config.vehicles)
        .with_context(|| format!("Failed to load instance {}", path.display()))?;

    let mut engine = LocalSearchEngine::new().with_seed(config.seed);
    let model = RoutingModel::build(&mut engine, Arc::new(instance), config.capacity_mode)?;
    let report = engine.solve(&config.budget())?;
    let solution = model.read_solution(&engine)?;
    let evaluation = model.evaluate(&solution)?;

    if !evaluation.is_feasible() {
        warn!(
            violations = evaluation.violations.len(),
            "solution violates hard constraints"
        );
    }
    if evaluation.objective.lateness > 0.0 {
        warn!(lateness = evaluation.objective.lateness, "solution is late");
    }
    info!(
        status = ?report.status,
        vehicles = evaluation.objective.vehicles_used,
        distance = evaluation.objective.distance,
        iterations = report.iterations,
        "solved"
    );

    let mut writer: Box<dyn Write> = match sub_m.get_one::<PathBuf>("output") {
        Some(out) => Box::new(BufWriter::new(
            File::create(out).with_context(|| format!("Failed to create {}", out.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    if sub_m.get_flag("json") {
        SolutionReport::new(
            kind,
            report.status,
            &solution,
            &evaluation,
            config.offset,
            report.iterations,
        )
        .write_json(&mut writer)?;
        writeln!(writer)?;
    } else {
        write_solution(&mut writer, kind, &solution, &evaluation, config.offset)?;
    }
    writer.flush()?;
    Ok(())
}
