use crate::point::{EntityId, PointHandle};
use crate::state::SimulationState;
use rand::RngCore;

/// Metadata shared by every process, regardless of arity: which entities it
/// reads and writes, and how far its propensity can be influenced by a
/// neighboring point.
pub trait ProcessInfo {
    fn inputs(&self) -> &[EntityId];
    fn outputs(&self) -> &[EntityId];

    /// How far a point can be from another before it stops influencing this
    /// process's propensity. Zero for arity-0/1 processes, which have no
    /// spatial dependency between points.
    fn input_radius(&self) -> f64 {
        0.0
    }

    fn name(&self) -> &str;
}

/// A process with no point inputs (e.g. immigration): propensity depends
/// only on global state, activation creates a point out of nothing.
pub trait Process0: ProcessInfo {
    fn propensity(&self, state: &SimulationState) -> f64;

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    );
}

/// A process with exactly one point input (e.g. death, jump, type change):
/// propensity is per-point and the total is `propensity() * count(entity)`.
pub trait Process1: ProcessInfo {
    fn propensity(&self) -> f64;

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        focal: PointHandle,
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    );
}

/// A pairwise process (e.g. consumption, facilitation): propensity is
/// evaluated per-configuration, over ordered pairs within `input_radius`.
///
/// Every concrete pairwise process shipped in [`crate::processes`] has
/// exactly two inputs; `ConfigurationSet` itself stays generic over arity,
/// but no 3-or-more-input template exists to ground a more general trait on.
pub trait ProcessPair: ProcessInfo {
    /// Base propensity assuming a Tophat-like kernel, where every
    /// configuration contributes the same weight.
    fn propensity(&self) -> f64;

    fn configuration_propensity(&self, state: &SimulationState, p: PointHandle, q: PointHandle) -> f64;

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        configuration: [PointHandle; 2],
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    );
}
