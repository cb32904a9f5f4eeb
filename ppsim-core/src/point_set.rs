use crate::accumulator::Accumulator;
use crate::coord::Coord;
use crate::error::InvariantViolation;
use crate::point::{EntityId, Point, PointKey};
use slotmap::SlotMap;

/// A grid-bucketed spatial set of points of a single entity type, tiling a
/// `U x U` torus at a fixed `bucket_width`.
///
/// Bucket `(x,y)` holds exactly the points whose floored coordinate is
/// `(x,y)`; an [`Accumulator`] over bucket occupancy supports O(log n)
/// uniform sampling and n-th-element lookup.
pub struct PointSet {
    u: f64,
    bucket_width: f64,
    row_length: usize,
    norm_coord: f64,
    buckets: Vec<Vec<PointKey>>,
    points: SlotMap<PointKey, Point>,
    accumulator: Accumulator<i64>,
}

impl PointSet {
    pub fn new(u: f64, bucket_width: f64) -> Self {
        let row_length = (u / bucket_width).ceil() as usize;
        let bucket_count = row_length * row_length;
        let depth = (bucket_count as f64).log2().floor() as u32;
        PointSet {
            u,
            bucket_width,
            row_length,
            norm_coord: row_length as f64 / u,
            buckets: vec![Vec::new(); bucket_count],
            points: SlotMap::with_key(),
            accumulator: Accumulator::new(bucket_count, depth),
        }
    }

    pub fn count(&self) -> usize {
        self.accumulator.total() as usize
    }

    pub fn entity_of(&self, key: PointKey) -> EntityId {
        self.points[key].entity()
    }

    pub fn point(&self, key: PointKey) -> &Point {
        &self.points[key]
    }

    /// Allocates a point but does not insert it into any bucket. Precondition:
    /// `0 <= x,y < U`; callers wrap coordinates before calling.
    pub fn new_point(&mut self, coord: Coord, entity: EntityId) -> PointKey {
        debug_assert!(coord.x() >= 0.0 && coord.x() < self.u);
        debug_assert!(coord.y() >= 0.0 && coord.y() < self.u);
        let bucket = self.bucket_index(self.bucket_coords(&coord));
        self.points.insert(Point::new(coord, entity, bucket))
    }

    pub fn add(&mut self, key: PointKey) {
        let bucket = self.points[key].bucket();
        self.buckets[bucket].push(key);
        self.accumulator.increment(bucket, 1);
    }

    pub fn destroy_point(&mut self, key: PointKey) -> Result<(), InvariantViolation> {
        let bucket = self.points[key].bucket();
        let list = &mut self.buckets[bucket];
        let pos = list.iter().position(|k| *k == key).ok_or_else(|| {
            InvariantViolation::new(
                "PointSet::destroy_point",
                "point not present in the bucket its own index names",
            )
        })?;
        list.swap_remove(pos);
        self.accumulator.increment(bucket, -1);
        self.points.remove(key);
        Ok(())
    }

    pub fn contains(&self, key: PointKey) -> bool {
        match self.points.get(key) {
            Some(p) => self.buckets[p.bucket()].contains(&key),
            None => false,
        }
    }

    /// Neighbors of `key` within torus distance `distance`, excluding `key` itself.
    pub fn get_within(&self, key: PointKey, distance: f64, out: &mut Vec<PointKey>) {
        let coord = self.points[key].coord();
        self.get_within_coord(coord, Some(key), distance, out);
    }

    /// Neighbors of an arbitrary coordinate within torus distance `distance`.
    ///
    /// `exclude` need not belong to this set - it only needs to belong to
    /// *some* set with this same grid geometry, so this works for the
    /// cross-entity queries a pairwise process runs against another
    /// entity's point set using the focal point's own coordinate.
    pub fn get_within_coord(&self, coord: Coord, exclude: Option<PointKey>, distance: f64, out: &mut Vec<PointKey>) {
        let cdistance = (distance / self.bucket_width + 0.5) as i64;
        if 2 * cdistance + 1 >= self.row_length as i64 {
            self.get_within_bruteforce(coord, exclude, distance, out);
        } else {
            self.get_within_clever(coord, exclude, distance, cdistance, out);
        }
    }

    fn get_within_clever(
        &self,
        coord: Coord,
        exclude: Option<PointKey>,
        distance: f64,
        cdistance: i64,
        out: &mut Vec<PointKey>,
    ) {
        let d_squared = distance * distance;
        let (cx, cy) = self.bucket_coords(&coord);
        for dx in -cdistance..=cdistance {
            for dy in -cdistance..=cdistance {
                let x = self.wrap_bucket_coord(cx as i64 + dx);
                let y = self.wrap_bucket_coord(cy as i64 + dy);
                let b = self.bucket_index((x, y));
                for &qk in &self.buckets[b] {
                    if Some(qk) == exclude {
                        continue;
                    }
                    let q = &self.points[qk];
                    if coord.torus_squared_distance(&q.coord(), self.u) <= d_squared {
                        out.push(qk);
                    }
                }
            }
        }
    }

    fn get_within_bruteforce(&self, coord: Coord, exclude: Option<PointKey>, distance: f64, out: &mut Vec<PointKey>) {
        let d_squared = distance * distance;
        for bucket in &self.buckets {
            for &qk in bucket {
                if Some(qk) == exclude {
                    continue;
                }
                let q = &self.points[qk];
                if coord.torus_squared_distance(&q.coord(), self.u) <= d_squared {
                    out.push(qk);
                }
            }
        }
    }

    /// Picks the `floor(rval * count)`-th point in bucket-linearized order.
    /// `rval` must be in `[0, 1)`.
    pub fn get_random(&self, rval: f64) -> Result<PointKey, InvariantViolation> {
        let count = self.count();
        if count == 0 {
            return Err(InvariantViolation::new(
                "PointSet::get_random",
                "called on an empty point set",
            ));
        }
        let n = (count as f64 * rval) as usize;
        self.get_nth(n)
    }

    pub fn get_nth(&self, n: usize) -> Result<PointKey, InvariantViolation> {
        let (start, remaining) = self.accumulator.find_start_location(n as i64);
        let mut remaining = remaining;
        for bucket in &self.buckets[start..] {
            for &key in bucket {
                if remaining == 0 {
                    return Ok(key);
                }
                remaining -= 1;
            }
        }
        Err(InvariantViolation::new(
            "PointSet::get_nth",
            format!("could not find {n}th point, remaining={remaining}, count={}", self.count()),
        ))
    }

    pub fn iter(&self) -> impl Iterator<Item = PointKey> + '_ {
        self.buckets.iter().flatten().copied()
    }

    fn bucket_coords(&self, coord: &Coord) -> (usize, usize) {
        let x = (coord.x() * self.norm_coord) as usize;
        let y = (coord.y() * self.norm_coord) as usize;
        (x, y)
    }

    fn bucket_index(&self, (x, y): (usize, usize)) -> usize {
        x + y * self.row_length
    }

    fn wrap_bucket_coord(&self, v: i64) -> usize {
        let row = self.row_length as i64;
        let wrapped = if v < 0 {
            v + row
        } else if v >= row {
            v - row
        } else {
            v
        };
        wrapped as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn brute_force_within(points: &[(PointKey, Coord)], focal: PointKey, focal_coord: Coord, distance: f64, u: f64) -> Vec<PointKey> {
        let d2 = distance * distance;
        points
            .iter()
            .filter(|(k, c)| *k != focal && focal_coord.torus_squared_distance(c, u) <= d2)
            .map(|(k, _)| *k)
            .collect()
    }

    #[test]
    fn add_then_destroy_restores_empty_state() {
        let mut ps = PointSet::new(10.0, 1.0);
        let k = ps.new_point(Coord::new(3.0, 3.0), 1);
        ps.add(k);
        assert_eq!(ps.count(), 1);
        ps.destroy_point(k).unwrap();
        assert_eq!(ps.count(), 0);
    }

    #[test]
    fn get_within_matches_bruteforce_s4() {
        let u = 20.0;
        let mut ps = PointSet::new(u, 1.0);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut all = Vec::new();
        for _ in 0..2000 {
            let c = Coord::new(rng.gen::<f64>() * u, rng.gen::<f64>() * u);
            let k = ps.new_point(c, 1);
            ps.add(k);
            all.push((k, c));
        }

        for &(focal, focal_coord) in &all {
            for &distance in &[0.5, 1.0, 2.0, 3.0, 10.0, 100.0] {
                let mut clever = Vec::new();
                ps.get_within(focal, distance, &mut clever);
                clever.sort();

                let mut brute = brute_force_within(&all, focal, focal_coord, distance, u);
                brute.sort();

                assert_eq!(clever, brute, "mismatch at distance {distance}");
            }
        }
    }

    #[test]
    fn get_within_full_domain_returns_everyone_else() {
        let u = 10.0;
        let mut ps = PointSet::new(u, 1.0);
        let mut keys = Vec::new();
        for i in 0..5 {
            let k = ps.new_point(Coord::new(i as f64, i as f64), 1);
            ps.add(k);
            keys.push(k);
        }
        let max_distance = u * std::f64::consts::SQRT_2 / 2.0;
        let mut out = Vec::new();
        ps.get_within(keys[0], max_distance, &mut out);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn get_random_near_one_never_panics() {
        let mut ps = PointSet::new(10.0, 1.0);
        for i in 0..10 {
            let k = ps.new_point(Coord::new(i as f64, 0.0), 1);
            ps.add(k);
        }
        let result = ps.get_random(0.999_999_999);
        assert!(result.is_ok());
    }
}
