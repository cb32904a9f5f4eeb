use crate::configuration::ConfigurationSet;
use crate::error::InvariantViolation;
use crate::point::{EntityId, PointHandle};
use crate::process::{Process0, Process1, ProcessInfo, ProcessPair};
use crate::state::SimulationState;
use rand::RngCore;
use std::collections::HashMap;

/// Keeps one process's propensity (and, for pairwise processes, its
/// [`ConfigurationSet`]) consistent as points are added and removed.
///
/// Three variants by arity, rather than a virtual-dispatch hierarchy: the
/// three shapes differ enough in what state they own that a tagged sum is
/// both cheaper and easier to read than a trait object with two of its three
/// methods always no-ops.
pub enum Tracker {
    Arity0 {
        process: Box<dyn Process0>,
    },
    Arity1 {
        process: Box<dyn Process1>,
    },
    Arity2 {
        process: Box<dyn ProcessPair>,
        configurations: ConfigurationSet<2>,
        /// entity -> which input slots (0 and/or 1) that entity fills
        entity_indices: HashMap<EntityId, Vec<usize>>,
    },
}

impl Tracker {
    pub fn new_arity0(process: Box<dyn Process0>) -> Self {
        Tracker::Arity0 { process }
    }

    pub fn new_arity1(process: Box<dyn Process1>) -> Self {
        Tracker::Arity1 { process }
    }

    pub fn new_arity2(process: Box<dyn ProcessPair>) -> Self {
        let mut entity_indices: HashMap<EntityId, Vec<usize>> = HashMap::new();
        for (slot, entity) in process.inputs().iter().enumerate() {
            entity_indices.entry(*entity).or_default().push(slot);
        }
        Tracker::Arity2 {
            process,
            configurations: ConfigurationSet::new(),
            entity_indices,
        }
    }

    /// Number of live configurations tracked for a pairwise process; `None`
    /// for arity 0/1, which track no configurations.
    pub fn configuration_count(&self) -> Option<i64> {
        match self {
            Tracker::Arity2 { configurations, .. } => Some(configurations.total_count()),
            _ => None,
        }
    }

    pub fn info(&self) -> &dyn ProcessInfo {
        match self {
            Tracker::Arity0 { process } => process.as_ref(),
            Tracker::Arity1 { process } => process.as_ref(),
            Tracker::Arity2 { process, .. } => process.as_ref(),
        }
    }

    pub fn propensity(&self, state: &SimulationState) -> f64 {
        match self {
            Tracker::Arity0 { process } => process.propensity(state),
            Tracker::Arity1 { process } => {
                let entity = process.inputs()[0];
                process.propensity() * state.count(entity) as f64
            }
            Tracker::Arity2 {
                process,
                configurations,
                ..
            } => configurations.total_real_weight() * process.propensity(),
        }
    }

    pub fn activate(
        &self,
        state: &mut SimulationState,
        rng: &mut dyn RngCore,
        removed: &mut Vec<PointHandle>,
        added: &mut Vec<PointHandle>,
    ) -> Result<(), InvariantViolation> {
        match self {
            Tracker::Arity0 { process } => {
                process.activate(state, rng, removed, added);
                Ok(())
            }
            Tracker::Arity1 { process } => {
                let entity = process.inputs()[0];
                let focal = state.random_point(entity)?;
                process.activate(state, rng, focal, removed, added);
                Ok(())
            }
            Tracker::Arity2 {
                process,
                configurations,
                ..
            } => {
                let rval = state.random_value();
                let configuration = configurations.get_random(rval)?;
                let points = configuration.points;
                process.activate(state, rng, points, removed, added);
                Ok(())
            }
        }
    }

    pub fn notify_remove(&mut self, state: &SimulationState, p: PointHandle) -> Result<(), InvariantViolation> {
        if let Tracker::Arity2 {
            process,
            configurations,
            entity_indices,
        } = self
        {
            if let Some(slots) = entity_indices.get(&p.entity).cloned() {
                for slot in slots {
                    let tuples = matching_tuples(process.as_ref(), state, p, slot);
                    for tuple in tuples {
                        configurations.find_and_destroy(&tuple)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn notify_add(&mut self, state: &SimulationState, p: PointHandle) -> Result<(), InvariantViolation> {
        if let Tracker::Arity2 {
            process,
            configurations,
            entity_indices,
        } = self
        {
            if let Some(slots) = entity_indices.get(&p.entity).cloned() {
                for slot in slots {
                    let tuples = matching_tuples(process.as_ref(), state, p, slot);
                    for tuple in tuples {
                        let w = process.configuration_propensity(state, tuple[0], tuple[1]);
                        if w > 0.0 {
                            configurations.add(w, tuple)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Cartesian product of candidate tuples with `p` fixed at `focal_slot` and
/// the other slot populated by a neighbor query within the process's
/// `input_radius`.
fn matching_tuples(
    process: &dyn ProcessPair,
    state: &SimulationState,
    p: PointHandle,
    focal_slot: usize,
) -> Vec<[PointHandle; 2]> {
    let other_slot = 1 - focal_slot;
    let other_entity = process.inputs()[other_slot];
    let mut neighbors = Vec::new();
    state.query_points(other_entity, p, process.input_radius(), &mut neighbors);

    neighbors
        .into_iter()
        .map(|q| {
            let mut tuple = [p, p];
            tuple[focal_slot] = p;
            tuple[other_slot] = q;
            tuple
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Tophat;
    use crate::processes::Consume;

    #[test]
    fn entity_indices_cover_both_slots_when_entities_repeat() {
        let process: Box<dyn ProcessPair> = Box::new(Consume::new(1, 0, Box::new(Tophat::new(1.0, 1.0))));
        let tracker = Tracker::new_arity2(process);
        if let Tracker::Arity2 { entity_indices, .. } = &tracker {
            assert_eq!(entity_indices.get(&1).unwrap(), &vec![0]);
            assert_eq!(entity_indices.get(&0).unwrap(), &vec![1]);
        } else {
            panic!("expected Arity2 tracker");
        }
    }
}
