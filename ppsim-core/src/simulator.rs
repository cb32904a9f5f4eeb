use crate::coord::Coord;
use crate::error::InvariantViolation;
use crate::kernel::Kernel;
use crate::model::Model;
use crate::point::{EntityId, PointHandle};
use crate::state::SimulationState;
use crate::writers::Writer;

/// Below this total propensity, the simulation halts: sampling a waiting
/// time from a near-zero rate would otherwise produce numerically useless
/// (effectively infinite) jumps.
const MINIMUM_HALT_PROPENSITY: f64 = 1e-10;

type HaltingCondition = Box<dyn Fn(&SimulationState) -> bool>;

/// Drives the Gillespie SSA loop over a [`Model`] and [`SimulationState`].
pub struct Simulator {
    done: bool,
    halt_reason: String,
    current_propensities: Vec<f64>,
    current_total: f64,
    model: Model,
    state: SimulationState,
    reactant_buffer: Vec<PointHandle>,
    product_buffer: Vec<PointHandle>,
    halting_conditions: Vec<HaltingCondition>,
    writers: Vec<Box<dyn Writer>>,
}

impl Simulator {
    pub fn new(mut model: Model, u: f64, seed: u64) -> Self {
        if !model.is_finalized() {
            model.finalize();
        }
        let process_count = model.process_count();
        let state = SimulationState::new(u, model.max_entity_id(), process_count, seed);
        Simulator {
            done: false,
            halt_reason: String::new(),
            current_propensities: vec![0.0; process_count],
            current_total: 0.0,
            model,
            state,
            reactant_buffer: Vec::new(),
            product_buffer: Vec::new(),
            halting_conditions: Vec::new(),
            writers: Vec::new(),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn halt_reason(&self) -> &str {
        &self.halt_reason
    }

    pub fn add_halting_condition(&mut self, f: impl Fn(&SimulationState) -> bool + 'static) {
        self.halting_conditions.push(Box::new(f));
    }

    pub fn add_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Recomputes and returns every tracker's current propensity, in model
    /// order. Useful as a pre-flight diagnostic on a freshly built scenario.
    pub fn propensities(&mut self) -> Result<&[f64], InvariantViolation> {
        self.recompute_propensities()?;
        Ok(&self.current_propensities)
    }

    pub fn total_propensity(&self) -> f64 {
        self.current_total
    }

    pub fn add_new_point(&mut self, coord: Coord, entity: EntityId) -> Result<(), InvariantViolation> {
        let p = self.state.new_point(coord, entity);
        self.state.add(p);
        self.process_added(p)?;
        Ok(())
    }

    /// Scatters points of `entity` uniformly at the given density (points per
    /// unit area).
    pub fn fill(&mut self, entity: EntityId, density: f64) -> Result<(), InvariantViolation> {
        let count = (density * self.state.area()) as usize;
        for _ in 0..count {
            let coord = self.state.random_coord();
            self.add_new_point(coord, entity)?;
        }
        Ok(())
    }

    /// Scatters points of `entity` around `center` following `kernel`'s
    /// dispersal distribution; the number of points added is
    /// `kernel.integral() * area`.
    pub fn fill_circle(&mut self, entity: EntityId, center: Coord, kernel: &dyn Kernel) -> Result<(), InvariantViolation> {
        let count = (kernel.integral() * self.state.area()) as usize;
        for _ in 0..count {
            let u = self.state.u();
            let coord = kernel.sample_around(self.state.rng_mut(), center, u);
            self.add_new_point(coord, entity)?;
        }
        Ok(())
    }

    fn recompute_propensities(&mut self) -> Result<(), InvariantViolation> {
        for (i, tracker) in self.model.trackers().iter().enumerate() {
            self.current_propensities[i] = tracker.propensity(&self.state);
        }
        self.current_total = kahan_sum(&self.current_propensities);
        if self.current_total <= MINIMUM_HALT_PROPENSITY {
            self.halt_reason = "Total propensity below minimum halting propensity.".to_string();
            self.done = true;
        }
        Ok(())
    }

    fn check_halting_conditions(&mut self) {
        for (i, f) in self.halting_conditions.iter().enumerate() {
            if f(&self.state) {
                self.done = true;
                self.halt_reason = format!("Halting condition #{i} triggered");
                break;
            }
        }
    }

    fn next_time(&mut self) -> f64 {
        let rval = self.state.random_value();
        -rval.ln() / self.current_total
    }

    fn next_reaction(&mut self) -> Result<usize, InvariantViolation> {
        let rval = self.state.random_value() * self.current_total;
        let mut mass = 0.0_f64;
        let mut correction = 0.0_f64;
        for (rid, &p) in self.current_propensities.iter().enumerate() {
            let y = p - correction;
            let t = mass + p;
            correction = (t - mass) - y;
            mass = t;
            if mass >= rval {
                return Ok(rid);
            }
        }
        Err(InvariantViolation::new(
            "Simulator::next_reaction",
            "total propensity exceeded the sum of individual propensities",
        ))
    }

    fn run_reaction(&mut self, rid: usize) -> Result<(), InvariantViolation> {
        self.reactant_buffer.clear();
        self.product_buffer.clear();

        {
            let mut reactants = std::mem::take(&mut self.reactant_buffer);
            let mut products = std::mem::take(&mut self.product_buffer);
            let mut rng = self.state.take_rng();
            let tracker = self.model.tracker(rid);
            tracker.activate(&mut self.state, &mut rng, &mut reactants, &mut products)?;
            self.state.put_rng(rng);
            self.reactant_buffer = reactants;
            self.product_buffer = products;
        }

        let reactants = std::mem::take(&mut self.reactant_buffer);
        for p in &reactants {
            for &dep in self.model.dependencies(p.entity).to_vec().iter() {
                self.model.tracker_mut(dep).notify_remove(&self.state, *p)?;
            }
            self.state.destroy_point(*p)?;
        }

        let products = std::mem::take(&mut self.product_buffer);
        for p in &products {
            self.state.add(*p);
            self.process_added(*p)?;
        }

        Ok(())
    }

    fn process_added(&mut self, p: PointHandle) -> Result<(), InvariantViolation> {
        for dep in self.model.dependencies(p.entity).to_vec() {
            self.model.tracker_mut(dep).notify_add(&self.state, p)?;
        }
        Ok(())
    }

    /// Executes a single SSA step; returns the elapsed simulated time (zero
    /// once halted).
    pub fn step(&mut self) -> Result<f64, InvariantViolation> {
        self.recompute_propensities()?;
        if self.done {
            return Ok(0.0);
        }
        self.check_halting_conditions();
        if self.done {
            return Ok(0.0);
        }

        let tau = self.next_time();
        let rid = self.next_reaction()?;
        self.state.stats.update(tau, rid);
        self.run_reaction(rid)?;

        for w in &mut self.writers {
            w.process_activated(&self.state, tau, rid).ok();
        }

        Ok(tau)
    }

    /// Advances the simulation for `t` simulated time units, or until halted.
    pub fn run(&mut self, t: f64) -> Result<(), InvariantViolation> {
        self.halt_reason = "Maximum time limit reached.".to_string();

        for w in &mut self.writers {
            w.start(&self.state).ok();
        }

        let mut elapsed = 0.0;
        while elapsed < t && !self.is_done() {
            elapsed += self.step()?;
        }

        for w in &mut self.writers {
            w.end(&self.state).ok();
        }

        Ok(())
    }
}

/// Halts once `entity` has no remaining points.
pub fn halt_on_extinction(entity: EntityId) -> impl Fn(&SimulationState) -> bool {
    move |state: &SimulationState| state.count(entity) == 0
}

fn kahan_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;
    for &v in values {
        let y = v - correction;
        let t = sum + v;
        correction = (t - sum) - y;
        sum = t;
    }
    sum
}
