use crate::coord::Coord;
use slotmap::new_key_type;

/// A mark / entity type identifier. Entities are dense small integers, used
/// directly as indices into `SimulationState`'s vector of per-entity point sets.
pub type EntityId = u32;

new_key_type! {
    /// Opaque, generation-checked key into one entity's point arena.
    ///
    /// Combined with the owning entity in [`PointHandle`], this is the
    /// stable, dangling-proof stand-in for the reference implementation's
    /// raw `Point*`.
    pub struct PointKey;
}

/// A fully-qualified, stable reference to a point: which entity's arena it
/// lives in, plus the key within that arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PointHandle {
    pub entity: EntityId,
    pub key: PointKey,
}

/// A located, typed entity. Only [`crate::point_set::PointSet`] constructs
/// these; everything else holds a [`PointHandle`] and looks the point up
/// through [`crate::state::SimulationState`].
#[derive(Clone, Debug)]
pub struct Point {
    coord: Coord,
    entity: EntityId,
    bucket: usize,
}

impl Point {
    pub(crate) fn new(coord: Coord, entity: EntityId, bucket: usize) -> Self {
        Point {
            coord,
            entity,
            bucket,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub(crate) fn bucket(&self) -> usize {
        self.bucket
    }

    pub fn torus_squared_distance(&self, other: &Point, u: f64) -> f64 {
        self.coord.torus_squared_distance(&other.coord, u)
    }
}
