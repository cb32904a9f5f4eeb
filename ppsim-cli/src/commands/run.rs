use crate::cli::PpsimOptions;
use crate::scenario::ScenarioSpec;
use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use ppsim_core::error::InputFormatError;
use ppsim_core::simulator::Simulator;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn run(options: PpsimOptions) -> Result<()> {
    let scenario = ScenarioSpec::load(&options.model).context("loading scenario file")?;

    let domain = options.domain.or(scenario.domain).ok_or_else(|| {
        anyhow!(ppsim_core::error::ConfigurationError::MissingParameter("domain (-U/--domain)"))
    })?;
    if options.domain.is_some() && scenario.domain.is_some() {
        info!("--domain overrides the scenario file's U");
    }

    let seed = match (options.seed, scenario.seed) {
        (Some(s), _) => s,
        (None, Some(s)) => s,
        (None, None) => {
            warn!("no --seed given and scenario has none; defaulting to 0");
            0
        }
    };

    let time_limit = if let Some(step) = options.step.or(scenario.step) {
        debug!("step count {step} overrides any time horizon");
        Some(step)
    } else {
        None
    };
    let horizon = options.time.or(scenario.time);
    if time_limit.is_none() && horizon.is_none() {
        return Err(anyhow!(ppsim_core::error::ConfigurationError::MissingParameter(
            "time (-t/--time) or step (-S/--step)"
        )));
    }

    let model = scenario.build_model().context("building model from scenario")?;

    let mut sim = Simulator::new(model, domain, seed);
    scenario.apply_init(&mut sim).context("applying scenario init directives")?;

    if let Some(path) = &options.input {
        load_input_points(&mut sim, path)?;
    }

    if options.propensity {
        let propensities: Vec<f64> = sim.propensities()?.to_vec();
        let total = sim.total_propensity();
        for (i, p) in propensities.iter().enumerate() {
            println!("{}\t{:e}", sim.model().tracker(i).info().name(), p);
        }
        println!("total\t{total:e}");
    }

    if let Some(step) = time_limit {
        sim.add_halting_condition(move |state| state.stats.total_events >= step);
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("installing SIGINT handler")?;
    let flag = interrupted.clone();
    sim.add_halting_condition(move |_state| flag.load(Ordering::SeqCst));

    if let Some(path) = &options.output {
        let file = File::create(path).with_context(|| format!("creating snapshot output {}", path.display()))?;
        sim.add_writer(Box::new(ppsim_core::writers::SnapshotWriter::new(
            BufWriter::new(file),
            options.dt,
        )));
    }
    if let Some(path) = &options.density {
        let file = File::create(path).with_context(|| format!("creating density output {}", path.display()))?;
        sim.add_writer(Box::new(ppsim_core::writers::DensityWriter::new(
            BufWriter::new(file),
            options.dt,
        )));
    }

    let t = horizon.unwrap_or(f64::INFINITY);
    info!("running until t={t} (seed={seed}, U={domain})");
    sim.run(t)?;

    if interrupted.load(Ordering::SeqCst) {
        info!("interrupted by SIGINT after reaching t={}", sim.state().stats.time);
    } else {
        info!("{}", sim.halt_reason());
    }

    Ok(())
}

fn load_input_points(sim: &mut Simulator, path: &std::path::Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening input point file {}", path.display()))?;
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(InputFormatError::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let parse_field = |f: Option<&str>, line: usize| -> Result<&str, InputFormatError> {
            f.ok_or_else(|| InputFormatError::MalformedRecord {
                line,
                detail: "expected 3 whitespace-separated fields: entity x y".to_string(),
            })
        };
        let entity: ppsim_core::point::EntityId = parse_field(fields.next(), lineno + 1)?
            .parse()
            .map_err(|_| InputFormatError::MalformedRecord {
                line: lineno + 1,
                detail: "entity must be an integer".to_string(),
            })?;
        let x: f64 = parse_field(fields.next(), lineno + 1)?
            .parse()
            .map_err(|_| InputFormatError::MalformedRecord {
                line: lineno + 1,
                detail: "x must be a float".to_string(),
            })?;
        let y: f64 = parse_field(fields.next(), lineno + 1)?
            .parse()
            .map_err(|_| InputFormatError::MalformedRecord {
                line: lineno + 1,
                detail: "y must be a float".to_string(),
            })?;
        sim.add_new_point(ppsim_core::coord::Coord::new(x, y), entity)?;
    }
    Ok(())
}
