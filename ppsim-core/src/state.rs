use crate::coord::Coord;
use crate::error::InvariantViolation;
use crate::point::{EntityId, Point, PointHandle};
use crate::point_set::PointSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulated time and per-process event counts.
#[derive(Clone, Debug)]
pub struct Statistics {
    pub time: f64,
    pub events_by_process: Vec<u64>,
    pub total_events: u64,
}

impl Statistics {
    pub fn new(process_count: usize) -> Self {
        Statistics {
            time: 0.0,
            events_by_process: vec![0; process_count],
            total_events: 0,
        }
    }

    pub fn update(&mut self, tau: f64, process_id: usize) {
        self.time += tau;
        self.events_by_process[process_id] += 1;
        self.total_events += 1;
    }
}

/// The full mutable state of a running simulation: the domain size, one
/// [`PointSet`] per entity, the shared PRNG, and running [`Statistics`].
pub struct SimulationState {
    u: f64,
    point_sets: Vec<PointSet>,
    rng: SmallRng,
    pub stats: Statistics,
}

impl SimulationState {
    pub fn new(u: f64, max_entity_id: EntityId, process_count: usize, seed: u64) -> Self {
        let point_sets = (0..=max_entity_id).map(|_| PointSet::new(u, 1.0)).collect();
        SimulationState {
            u,
            point_sets,
            rng: SmallRng::seed_from_u64(seed),
            stats: Statistics::new(process_count),
        }
    }

    pub fn u(&self) -> f64 {
        self.u
    }

    pub fn area(&self) -> f64 {
        self.u * self.u
    }

    pub fn center(&self) -> Coord {
        Coord::new(self.u / 2.0, self.u / 2.0)
    }

    pub fn max_entity_id(&self) -> EntityId {
        (self.point_sets.len() - 1) as EntityId
    }

    pub fn new_point(&mut self, coord: Coord, entity: EntityId) -> PointHandle {
        let key = self.point_sets[entity as usize].new_point(coord, entity);
        PointHandle { entity, key }
    }

    pub fn add(&mut self, handle: PointHandle) {
        self.point_sets[handle.entity as usize].add(handle.key);
    }

    pub fn destroy_point(&mut self, handle: PointHandle) -> Result<(), InvariantViolation> {
        self.point_sets[handle.entity as usize].destroy_point(handle.key)
    }

    pub fn point(&self, handle: PointHandle) -> &Point {
        self.point_sets[handle.entity as usize].point(handle.key)
    }

    pub fn count(&self, entity: EntityId) -> usize {
        self.point_sets[entity as usize].count()
    }

    pub fn total_count(&self) -> usize {
        self.point_sets.iter().map(PointSet::count).sum()
    }

    /// Neighbors of `focal` within `distance` among points of `entity`.
    ///
    /// `focal` need not itself be of `entity`'s type - a pairwise process
    /// queries the *other* entity's point set around its own focal point.
    pub fn query_points(&self, entity: EntityId, focal: PointHandle, distance: f64, out: &mut Vec<PointHandle>) {
        let focal_coord = self.point(focal).coord();
        let exclude = if entity == focal.entity { Some(focal.key) } else { None };
        let mut keys = Vec::new();
        self.point_sets[entity as usize].get_within_coord(focal_coord, exclude, distance, &mut keys);
        out.extend(keys.into_iter().map(|key| PointHandle { entity, key }));
    }

    pub fn random_value(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub fn random_coord(&mut self) -> Coord {
        let x = self.random_value() * self.u;
        let y = self.random_value() * self.u;
        Coord::new(x, y)
    }

    pub fn random_point(&mut self, entity: EntityId) -> Result<PointHandle, InvariantViolation> {
        let rval = self.random_value();
        let key = self.point_sets[entity as usize].get_random(rval)?;
        Ok(PointHandle { entity, key })
    }

    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Temporarily removes the PRNG so it can be threaded through a call that
    /// also needs `&mut self` (e.g. process activation, which takes state and
    /// rng as separate arguments so process traits stay object-safe). Pair
    /// with [`SimulationState::put_rng`].
    pub fn take_rng(&mut self) -> SmallRng {
        std::mem::replace(&mut self.rng, SmallRng::seed_from_u64(0))
    }

    pub fn put_rng(&mut self, rng: SmallRng) {
        self.rng = rng;
    }

    pub fn enumerate(&self) -> Vec<PointHandle> {
        let mut out = Vec::with_capacity(self.total_count());
        for (entity, ps) in self.point_sets.iter().enumerate() {
            out.extend(ps.iter().map(|key| PointHandle {
                entity: entity as EntityId,
                key,
            }));
        }
        out
    }
}
