use ppsim_core::coord::Coord;
use ppsim_core::error::ConfigurationError;
use ppsim_core::kernel::Tophat;
use ppsim_core::model::Model;
use ppsim_core::point::EntityId;
use ppsim_core::processes::{
    Birth, BirthByConsumption, ChangeInType, ChangeInTypeByConsumption, ChangeInTypeByFacilitation, Consume, Death,
    Immigration, Jump,
};
use ppsim_core::simulator::Simulator;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One entry of a scenario's process list: a tagged enum with one variant per
/// concrete template in [`ppsim_core::processes`].
#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
pub enum ProcessSpec {
    Immigration { entity: EntityId, rate: f64 },
    Death { entity: EntityId, rate: f64 },
    ChangeInType { source: EntityId, target: EntityId, rate: f64 },
    Jump { entity: EntityId, integral: f64, radius: f64 },
    Birth { parent: EntityId, child: EntityId, integral: f64, radius: f64 },
    Consume { consumer: EntityId, resource: EntityId, integral: f64, radius: f64 },
    ChangeInTypeByFacilitation {
        source: EntityId,
        facilitator: EntityId,
        target: EntityId,
        integral: f64,
        radius: f64,
    },
    ChangeInTypeByConsumption {
        source: EntityId,
        resource: EntityId,
        target: EntityId,
        integral: f64,
        radius: f64,
    },
    BirthByConsumption {
        parent: EntityId,
        resource: EntityId,
        child: EntityId,
        integral: f64,
        radius: f64,
    },
}

/// An initial-state directive: either explicit points, or a fill density.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind")]
pub enum InitSpec {
    Point { entity: EntityId, x: f64, y: f64 },
    Fill { entity: EntityId, density: f64 },
}

/// The JSON model-file format consumed by the CLI shell.
///
/// Command-line flags for the same value (`--time`/`--step`, `--domain`,
/// `--seed`, `--dt`) take precedence over the scenario file when present.
#[derive(Debug, Deserialize)]
pub struct ScenarioSpec {
    #[serde(rename = "U")]
    pub domain: Option<f64>,
    pub seed: Option<u64>,
    pub time: Option<f64>,
    pub step: Option<u64>,
    pub dt: Option<f64>,
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
    #[serde(default)]
    pub init: Vec<InitSpec>,
}

impl ScenarioSpec {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text =
            fs::read_to_string(path).map_err(|e| ConfigurationError::UnrecognizedOption(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| ConfigurationError::UnrecognizedOption(format!("malformed scenario file: {e}")))
    }

    pub fn build_model(&self) -> Result<Model, ConfigurationError> {
        let mut model = Model::new();
        for spec in &self.processes {
            match spec {
                ProcessSpec::Immigration { entity, rate } => {
                    model.add0(Box::new(Immigration::new(*entity, *rate)))?;
                }
                ProcessSpec::Death { entity, rate } => {
                    model.add1(Box::new(Death::new(*entity, *rate)))?;
                }
                ProcessSpec::ChangeInType { source, target, rate } => {
                    model.add1(Box::new(ChangeInType::new(*source, *target, *rate)))?;
                }
                ProcessSpec::Jump { entity, integral, radius } => {
                    model.add1(Box::new(Jump::new(*entity, Box::new(Tophat::new(*integral, *radius)))))?;
                }
                ProcessSpec::Birth {
                    parent,
                    child,
                    integral,
                    radius,
                } => {
                    model.add1(Box::new(Birth::new(*parent, *child, Box::new(Tophat::new(*integral, *radius)))))?;
                }
                ProcessSpec::Consume {
                    consumer,
                    resource,
                    integral,
                    radius,
                } => {
                    model.add2(Box::new(Consume::new(*consumer, *resource, Box::new(Tophat::new(*integral, *radius)))))?;
                }
                ProcessSpec::ChangeInTypeByFacilitation {
                    source,
                    facilitator,
                    target,
                    integral,
                    radius,
                } => {
                    model.add2(Box::new(ChangeInTypeByFacilitation::new(
                        *source,
                        *facilitator,
                        *target,
                        Box::new(Tophat::new(*integral, *radius)),
                    )))?;
                }
                ProcessSpec::ChangeInTypeByConsumption {
                    source,
                    resource,
                    target,
                    integral,
                    radius,
                } => {
                    model.add2(Box::new(ChangeInTypeByConsumption::new(
                        *source,
                        *resource,
                        *target,
                        Box::new(Tophat::new(*integral, *radius)),
                    )))?;
                }
                ProcessSpec::BirthByConsumption {
                    parent,
                    resource,
                    child,
                    integral,
                    radius,
                } => {
                    model.add2(Box::new(BirthByConsumption::new(
                        *parent,
                        *resource,
                        *child,
                        Box::new(Tophat::new(*integral, *radius)),
                    )))?;
                }
            }
        }
        model.finalize();
        Ok(model)
    }

    /// Populates a freshly built `Simulator` from the scenario's `init` directives.
    pub fn apply_init(&self, sim: &mut Simulator) -> ppsim_core::error::Result<()> {
        for directive in &self.init {
            match directive {
                InitSpec::Point { entity, x, y } => {
                    sim.add_new_point(Coord::new(*x, *y), *entity)?;
                }
                InitSpec::Fill { entity, density } => {
                    sim.fill(*entity, *density)?;
                }
            }
        }
        Ok(())
    }
}
