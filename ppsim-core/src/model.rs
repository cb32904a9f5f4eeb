use crate::error::ConfigurationError;
use crate::point::EntityId;
use crate::process::{Process0, Process1, ProcessPair};
use crate::tracker::Tracker;
use std::collections::BTreeSet;

/// A process registry: an ordered list of [`Tracker`]s plus the entity
/// dependency map derived from them. Built incrementally with `add_*`, then
/// frozen with [`Model::finalize`].
pub struct Model {
    trackers: Vec<Tracker>,
    entities: BTreeSet<EntityId>,
    dependencies: Vec<Vec<usize>>,
    finalized: bool,
}

impl Model {
    pub fn new() -> Self {
        Model {
            trackers: Vec::new(),
            entities: BTreeSet::new(),
            dependencies: Vec::new(),
            finalized: false,
        }
    }

    fn track_entities(&mut self, inputs: &[EntityId], outputs: &[EntityId]) {
        self.entities.extend(inputs.iter().copied());
        self.entities.extend(outputs.iter().copied());
    }

    pub fn add0(&mut self, process: Box<dyn Process0>) -> Result<(), ConfigurationError> {
        if self.finalized {
            return Err(ConfigurationError::AlreadyFinalized);
        }
        self.track_entities(process.inputs(), process.outputs());
        self.trackers.push(Tracker::new_arity0(process));
        Ok(())
    }

    pub fn add1(&mut self, process: Box<dyn Process1>) -> Result<(), ConfigurationError> {
        if self.finalized {
            return Err(ConfigurationError::AlreadyFinalized);
        }
        self.track_entities(process.inputs(), process.outputs());
        self.trackers.push(Tracker::new_arity1(process));
        Ok(())
    }

    pub fn add2(&mut self, process: Box<dyn ProcessPair>) -> Result<(), ConfigurationError> {
        if self.finalized {
            return Err(ConfigurationError::AlreadyFinalized);
        }
        self.track_entities(process.inputs(), process.outputs());
        self.trackers.push(Tracker::new_arity2(process));
        Ok(())
    }

    /// Computes the entity -> dependent-tracker-index mapping and freezes the model.
    pub fn finalize(&mut self) {
        let max_entity = self.max_entity_id();
        self.dependencies = vec![Vec::new(); max_entity as usize + 1];
        for (i, tracker) in self.trackers.iter().enumerate() {
            for &entity in tracker.info().inputs() {
                self.dependencies[entity as usize].push(i);
            }
        }
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn max_entity_id(&self) -> EntityId {
        self.entities.iter().copied().max().unwrap_or(0)
    }

    pub fn process_count(&self) -> usize {
        self.trackers.len()
    }

    pub fn dependencies(&self, entity: EntityId) -> &[usize] {
        &self.dependencies[entity as usize]
    }

    pub fn tracker(&self, i: usize) -> &Tracker {
        &self.trackers[i]
    }

    pub fn tracker_mut(&mut self, i: usize) -> &mut Tracker {
        &mut self.trackers[i]
    }

    pub fn trackers(&self) -> &[Tracker] {
        &self.trackers
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processes::{Death, Immigration};

    #[test]
    fn dependencies_map_entity_to_consuming_trackers() {
        let mut model = Model::new();
        model.add0(Box::new(Immigration::new(1, 1.0))).unwrap();
        model.add1(Box::new(Death::new(1, 1.0))).unwrap();
        model.finalize();

        assert_eq!(model.dependencies(1), &[1]);
    }

    #[test]
    fn adding_after_finalize_is_rejected() {
        let mut model = Model::new();
        model.add0(Box::new(Immigration::new(1, 1.0))).unwrap();
        model.finalize();
        assert!(model.add1(Box::new(Death::new(1, 1.0))).is_err());
    }
}
