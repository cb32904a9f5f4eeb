use clap::Parser;
use std::path::PathBuf;

/// Spatially-explicit marked point process simulator, driven by the
/// Gillespie stochastic simulation algorithm on a periodic 2D domain.
#[derive(Debug, Parser)]
pub struct PpsimOptions {
    /// Verbosity of the command line output.
    #[clap(long, default_value = "info")]
    pub log_level: log::Level,

    /// Simulation horizon, in simulated time units.
    #[clap(short = 't', long)]
    pub time: Option<f64>,

    /// Step count; overrides `--time` when given.
    #[clap(short = 'S', long)]
    pub step: Option<u64>,

    /// Writer emission interval.
    #[clap(long, default_value = "1.0")]
    pub dt: f64,

    /// Domain side length `U`, for the periodic `[0, U)^2` torus.
    #[clap(short = 'U', long)]
    pub domain: Option<f64>,

    /// JSON scenario file describing the model and initial state.
    #[clap(short = 'm', long)]
    pub model: PathBuf,

    /// Whitespace-separated `entity x y` point file, seeding initial state
    /// in addition to the scenario's own `init` directives.
    #[clap(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Snapshot output path; omit to skip snapshot output.
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Density output path; omit to skip density output.
    #[clap(short = 'd', long)]
    pub density: Option<PathBuf>,

    /// PRNG seed; overrides the scenario file's `seed` when given.
    #[clap(short = 's', long)]
    pub seed: Option<u64>,

    /// Print every tracker's initial propensity and the total, then exit.
    #[clap(short = 'p', long)]
    pub propensity: bool,
}
