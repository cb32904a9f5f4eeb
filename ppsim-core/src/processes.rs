//! Concrete process templates, ported from the reference simulator's
//! process definition library. Each is an ordinary implementor of the
//! [`crate::process`] arity traits - the engine never names these types
//! directly, only the traits.

use crate::kernel::Kernel;
use crate::point::{EntityId, PointHandle};
use crate::process::{Process0, Process1, ProcessInfo, ProcessPair};
use crate::state::SimulationState;
use rand::RngCore;

/// Creates points of `entity` at a uniformly random location, at rate
/// proportional to domain area.
pub struct Immigration {
    entity: EntityId,
    rate: f64,
    inputs: [EntityId; 0],
    outputs: [EntityId; 1],
}

impl Immigration {
    pub fn new(entity: EntityId, rate: f64) -> Self {
        Immigration {
            entity,
            rate,
            inputs: [],
            outputs: [entity],
        }
    }
}

impl ProcessInfo for Immigration {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn name(&self) -> &str {
        "Immigration"
    }
}

impl Process0 for Immigration {
    fn propensity(&self, state: &SimulationState) -> f64 {
        self.rate * state.area()
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        _rng: &mut dyn RngCore,
        _removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let coord = state.random_coord();
        added.push(state.new_point(coord, self.entity));
    }
}

/// Removes a point of `entity` at a constant per-point rate, independent of
/// local density.
pub struct Death {
    rate: f64,
    inputs: [EntityId; 1],
    outputs: [EntityId; 0],
}

impl Death {
    pub fn new(entity: EntityId, rate: f64) -> Self {
        Death {
            rate,
            inputs: [entity],
            outputs: [],
        }
    }
}

impl ProcessInfo for Death {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn name(&self) -> &str {
        "Death"
    }
}

impl Process1 for Death {
    fn propensity(&self) -> f64 {
        self.rate
    }

    fn activate(
        &self,
        _state: &mut SimulationState,
        _rng: &mut dyn RngCore,
        focal: PointHandle,
        removed: &mut Vec<PointHandle>,
        _added: &mut Vec<PointHandle>,
    ) {
        removed.push(focal);
    }
}

/// Replaces a point of `source` with a point of `target` at the same location.
pub struct ChangeInType {
    rate: f64,
    inputs: [EntityId; 1],
    outputs: [EntityId; 1],
}

impl ChangeInType {
    pub fn new(source: EntityId, target: EntityId, rate: f64) -> Self {
        ChangeInType {
            rate,
            inputs: [source],
            outputs: [target],
        }
    }
}

impl ProcessInfo for ChangeInType {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn name(&self) -> &str {
        "ChangeInType"
    }
}

impl Process1 for ChangeInType {
    fn propensity(&self) -> f64 {
        self.rate
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        _rng: &mut dyn RngCore,
        focal: PointHandle,
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let coord = state.point(focal).coord();
        removed.push(focal);
        added.push(state.new_point(coord, self.outputs[0]));
    }
}

/// Removes a point of `entity` and adds a new one of `entity` offset by the
/// kernel's dispersal distribution.
pub struct Jump {
    kernel: Box<dyn Kernel>,
    inputs: [EntityId; 1],
    outputs: [EntityId; 1],
}

impl Jump {
    pub fn new(entity: EntityId, kernel: Box<dyn Kernel>) -> Self {
        Jump {
            kernel,
            inputs: [entity],
            outputs: [entity],
        }
    }
}

impl ProcessInfo for Jump {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn name(&self) -> &str {
        "Jump"
    }
}

impl Process1 for Jump {
    fn propensity(&self) -> f64 {
        self.kernel.integral()
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        focal: PointHandle,
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let coord = state.point(focal).coord();
        let u = state.u();
        let target = self.kernel.sample_around(rng, coord, u);
        removed.push(focal);
        added.push(state.new_point(target, self.outputs[0]));
    }
}

/// Adds a point of `child` near a `parent` point, without removing the
/// parent. Dispersal distance follows the kernel.
pub struct Birth {
    kernel: Box<dyn Kernel>,
    inputs: [EntityId; 1],
    outputs: [EntityId; 1],
}

impl Birth {
    pub fn new(parent: EntityId, child: EntityId, kernel: Box<dyn Kernel>) -> Self {
        Birth {
            kernel,
            inputs: [parent],
            outputs: [child],
        }
    }
}

impl ProcessInfo for Birth {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn name(&self) -> &str {
        "Birth"
    }
}

impl Process1 for Birth {
    fn propensity(&self) -> f64 {
        self.kernel.integral()
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        focal: PointHandle,
        _removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let coord = state.point(focal).coord();
        let u = state.u();
        let target = self.kernel.sample_around(rng, coord, u);
        added.push(state.new_point(target, self.outputs[0]));
    }
}

/// Consumes a `resource` point within kernel range of a `consumer` point.
/// The consumer survives; only the resource is removed.
pub struct Consume {
    kernel: Box<dyn Kernel>,
    inputs: [EntityId; 2],
    outputs: [EntityId; 0],
}

impl Consume {
    pub fn new(consumer: EntityId, resource: EntityId, kernel: Box<dyn Kernel>) -> Self {
        Consume {
            kernel,
            inputs: [consumer, resource],
            outputs: [],
        }
    }
}

impl ProcessInfo for Consume {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn input_radius(&self) -> f64 {
        self.kernel.radius()
    }
    fn name(&self) -> &str {
        "Consume"
    }
}

impl ProcessPair for Consume {
    fn propensity(&self) -> f64 {
        self.kernel.value_at_squared_distance(0.0)
    }

    fn configuration_propensity(&self, state: &SimulationState, p: PointHandle, q: PointHandle) -> f64 {
        let d = state.point(p).torus_squared_distance(state.point(q), state.u());
        self.kernel.value_at_squared_distance(d)
    }

    fn activate(
        &self,
        _state: &mut SimulationState,
        _rng: &mut dyn RngCore,
        configuration: [PointHandle; 2],
        removed: &mut Vec<PointHandle>,
        _added: &mut Vec<PointHandle>,
    ) {
        removed.push(configuration[1]);
    }
}

/// A `source` point near a `facilitator` point changes into a `target` point,
/// displaced from the source by the kernel's dispersal distribution. The
/// facilitator is untouched.
pub struct ChangeInTypeByFacilitation {
    kernel: Box<dyn Kernel>,
    inputs: [EntityId; 2],
    outputs: [EntityId; 1],
}

impl ChangeInTypeByFacilitation {
    pub fn new(source: EntityId, facilitator: EntityId, target: EntityId, kernel: Box<dyn Kernel>) -> Self {
        ChangeInTypeByFacilitation {
            kernel,
            inputs: [source, facilitator],
            outputs: [target],
        }
    }
}

impl ProcessInfo for ChangeInTypeByFacilitation {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn input_radius(&self) -> f64 {
        self.kernel.radius()
    }
    fn name(&self) -> &str {
        "ChangeInTypeByFacilitation"
    }
}

impl ProcessPair for ChangeInTypeByFacilitation {
    fn propensity(&self) -> f64 {
        self.kernel.value_at_squared_distance(0.0)
    }

    fn configuration_propensity(&self, state: &SimulationState, p: PointHandle, q: PointHandle) -> f64 {
        let d = state.point(p).torus_squared_distance(state.point(q), state.u());
        self.kernel.value_at_squared_distance(d)
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        configuration: [PointHandle; 2],
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let source_coord = state.point(configuration[0]).coord();
        let u = state.u();
        let target = self.kernel.sample_around(rng, source_coord, u);
        removed.push(configuration[0]);
        added.push(state.new_point(target, self.outputs[0]));
    }
}

/// A `source` point within kernel range of a `resource` point consumes it and
/// changes into a `target` point, displaced from the source.
pub struct ChangeInTypeByConsumption {
    kernel: Box<dyn Kernel>,
    inputs: [EntityId; 2],
    outputs: [EntityId; 1],
}

impl ChangeInTypeByConsumption {
    pub fn new(source: EntityId, resource: EntityId, target: EntityId, kernel: Box<dyn Kernel>) -> Self {
        ChangeInTypeByConsumption {
            kernel,
            inputs: [source, resource],
            outputs: [target],
        }
    }
}

impl ProcessInfo for ChangeInTypeByConsumption {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn input_radius(&self) -> f64 {
        self.kernel.radius()
    }
    fn name(&self) -> &str {
        "ChangeInTypeByConsumption"
    }
}

impl ProcessPair for ChangeInTypeByConsumption {
    fn propensity(&self) -> f64 {
        self.kernel.value_at_squared_distance(0.0)
    }

    fn configuration_propensity(&self, state: &SimulationState, p: PointHandle, q: PointHandle) -> f64 {
        let d = state.point(p).torus_squared_distance(state.point(q), state.u());
        self.kernel.value_at_squared_distance(d)
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        configuration: [PointHandle; 2],
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let source_coord = state.point(configuration[0]).coord();
        let u = state.u();
        let target = self.kernel.sample_around(rng, source_coord, u);
        removed.push(configuration[0]);
        removed.push(configuration[1]);
        added.push(state.new_point(target, self.outputs[0]));
    }
}

/// A `parent` point within kernel range of a `resource` point consumes it
/// and gives birth to a `child` point, displaced from the parent.
pub struct BirthByConsumption {
    kernel: Box<dyn Kernel>,
    inputs: [EntityId; 2],
    outputs: [EntityId; 1],
}

impl BirthByConsumption {
    pub fn new(parent: EntityId, resource: EntityId, child: EntityId, kernel: Box<dyn Kernel>) -> Self {
        BirthByConsumption {
            kernel,
            inputs: [parent, resource],
            outputs: [child],
        }
    }
}

impl ProcessInfo for BirthByConsumption {
    fn inputs(&self) -> &[EntityId] {
        &self.inputs
    }
    fn outputs(&self) -> &[EntityId] {
        &self.outputs
    }
    fn input_radius(&self) -> f64 {
        self.kernel.radius()
    }
    fn name(&self) -> &str {
        "BirthByConsumption"
    }
}

impl ProcessPair for BirthByConsumption {
    fn propensity(&self) -> f64 {
        self.kernel.value_at_squared_distance(0.0)
    }

    fn configuration_propensity(&self, state: &SimulationState, p: PointHandle, q: PointHandle) -> f64 {
        let d = state.point(p).torus_squared_distance(state.point(q), state.u());
        self.kernel.value_at_squared_distance(d)
    }

    fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        configuration: [PointHandle; 2],
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) {
        let parent_coord = state.point(configuration[0]).coord();
        let u = state.u();
        let target = self.kernel.sample_around(rng, parent_coord, u);
        removed.push(configuration[1]);
        added.push(state.new_point(target, self.outputs[0]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Tophat;

    #[test]
    fn death_propensity_is_rate() {
        let d = Death::new(1, 0.5);
        assert_eq!(d.propensity(), 0.5);
    }

    #[test]
    fn consume_input_radius_matches_kernel() {
        let c = Consume::new(1, 0, Box::new(Tophat::new(1.0, 2.5)));
        assert_eq!(c.input_radius(), 2.5);
    }
}
