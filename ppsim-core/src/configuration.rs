use crate::accumulator::Accumulator;
use crate::error::InvariantViolation;
use crate::point::PointHandle;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const DEFAULT_BUCKET_COUNT: usize = 4096;

/// A weighted tuple of `K` points satisfying some process's kernel support.
/// Tuple order matters: `(a,b)` and `(b,a)` are distinct configurations.
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration<const K: usize> {
    pub points: [PointHandle; K],
    pub weight: f64,
}

/// Hash-bucketed collection of [`Configuration`]s with weighted and uniform
/// sampling, backed by an [`Accumulator`] over bucket occupancy.
///
/// The accumulator tracks *counts*, not real weights - see the open-question
/// note in DESIGN.md. `get_nth`/`get_random` sample uniformly by count and
/// are exact; `get_by_weight` degrades to a linear scan past the accumulator's
/// bucket resolution, which only samples uniformly by weight when every
/// configuration has equal weight (true for the shipped `Tophat` kernel).
pub struct ConfigurationSet<const K: usize> {
    buckets: Vec<Vec<Configuration<K>>>,
    accumulator: Accumulator<i64>,
    total_weight: f64,
}

impl<const K: usize> ConfigurationSet<K> {
    pub fn new() -> Self {
        Self::with_bucket_count(DEFAULT_BUCKET_COUNT)
    }

    pub fn with_bucket_count(bucket_count: usize) -> Self {
        let depth = (bucket_count as f64).log2().floor() as u32;
        ConfigurationSet {
            buckets: vec![Vec::new(); bucket_count],
            accumulator: Accumulator::new(bucket_count, depth),
            total_weight: 0.0,
        }
    }

    fn bucket_for(&self, points: &[PointHandle; K]) -> usize {
        let mut hasher = DefaultHasher::new();
        for p in points {
            p.hash(&mut hasher);
        }
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    /// Inserts a new configuration. Rejects a tuple already present, matching
    /// the reference's `assert(!contains(c))` guard in `add` - a
    /// configuration must appear at most once.
    pub fn add(&mut self, weight: f64, points: [PointHandle; K]) -> Result<(), InvariantViolation> {
        if self.contains(&points) {
            return Err(InvariantViolation::new(
                "ConfigurationSet::add",
                format!("configuration {points:?} already exists"),
            ));
        }
        let b = self.bucket_for(&points);
        self.buckets[b].push(Configuration { points, weight });
        self.accumulator.increment(b, 1);
        self.total_weight += weight;
        Ok(())
    }

    pub fn contains(&self, points: &[PointHandle; K]) -> bool {
        let b = self.bucket_for(points);
        self.buckets[b].iter().any(|c| &c.points == points)
    }

    pub fn find_and_destroy(&mut self, points: &[PointHandle; K]) -> Result<(), InvariantViolation> {
        let b = self.bucket_for(points);
        let bucket = &mut self.buckets[b];
        let pos = bucket.iter().position(|c| &c.points == points).ok_or_else(|| {
            InvariantViolation::new(
                "ConfigurationSet::find_and_destroy",
                format!("no configuration matches {points:?}"),
            )
        })?;
        let removed = bucket.swap_remove(pos);
        self.accumulator.increment(b, -1);
        self.total_weight -= removed.weight;
        Ok(())
    }

    pub fn total_count(&self) -> i64 {
        self.accumulator.total()
    }

    pub fn total_real_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn get_by_weight(&self, weight: f64) -> Result<&Configuration<K>, InvariantViolation> {
        let (start, remaining) = self.accumulator.find_start_location(weight as i64);
        let mut remaining = remaining as f64;
        for bucket in &self.buckets[start..] {
            for c in bucket {
                remaining -= c.weight;
                if remaining <= 0.0 {
                    return Ok(c);
                }
            }
        }
        Err(InvariantViolation::new(
            "ConfigurationSet::get_by_weight",
            format!("did not find an item for weight {weight}"),
        ))
    }

    pub fn get_nth(&self, n: usize) -> Result<&Configuration<K>, InvariantViolation> {
        let (start, remaining) = self.accumulator.find_start_location(n as i64);
        let mut remaining = remaining;
        for bucket in &self.buckets[start..] {
            for c in bucket {
                if remaining == 0 {
                    return Ok(c);
                }
                remaining -= 1;
            }
        }
        Err(InvariantViolation::new(
            "ConfigurationSet::get_nth",
            format!("could not find {n}th configuration, count={}", self.total_count()),
        ))
    }

    /// Uniform sampling by count; `rval` must be in `[0, 1)`.
    pub fn get_random(&self, rval: f64) -> Result<&Configuration<K>, InvariantViolation> {
        let count = self.total_count();
        if count == 0 {
            return Err(InvariantViolation::new(
                "ConfigurationSet::get_random",
                "called on an empty configuration set",
            ));
        }
        let n = (count as f64 * rval) as usize;
        self.get_nth(n)
    }
}

impl<const K: usize> Default for ConfigurationSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{EntityId, PointKey};
    use slotmap::SlotMap;

    fn handle(entity: EntityId, key: PointKey) -> PointHandle {
        PointHandle { entity, key }
    }

    #[test]
    fn add_then_find_and_destroy_is_idempotent() {
        let mut sm: SlotMap<PointKey, ()> = SlotMap::with_key();
        let k1 = sm.insert(());
        let k2 = sm.insert(());
        let p1 = handle(1, k1);
        let p2 = handle(0, k2);

        let mut cs: ConfigurationSet<2> = ConfigurationSet::new();
        cs.add(1.0, [p1, p2]).unwrap();
        assert_eq!(cs.total_count(), 1);

        cs.find_and_destroy(&[p1, p2]).unwrap();
        assert_eq!(cs.total_count(), 0);
        assert_eq!(cs.total_real_weight(), 0.0);
    }

    #[test]
    fn order_sensitive_tuples_are_distinct() {
        let mut sm: SlotMap<PointKey, ()> = SlotMap::with_key();
        let k1 = sm.insert(());
        let k2 = sm.insert(());
        let p1 = handle(1, k1);
        let p2 = handle(0, k2);

        let mut cs: ConfigurationSet<2> = ConfigurationSet::new();
        cs.add(1.0, [p1, p2]).unwrap();
        assert!(!cs.contains(&[p2, p1]));
        assert!(cs.contains(&[p1, p2]));
    }

    #[test]
    fn add_of_duplicate_is_rejected() {
        let mut sm: SlotMap<PointKey, ()> = SlotMap::with_key();
        let k1 = sm.insert(());
        let k2 = sm.insert(());
        let p1 = handle(1, k1);
        let p2 = handle(0, k2);

        let mut cs: ConfigurationSet<2> = ConfigurationSet::new();
        cs.add(1.0, [p1, p2]).unwrap();
        assert!(cs.add(2.0, [p1, p2]).is_err());
        assert_eq!(cs.total_count(), 1);
        assert_eq!(cs.total_real_weight(), 1.0);
    }

    #[test]
    fn missing_tuple_is_invariant_violation() {
        let mut sm: SlotMap<PointKey, ()> = SlotMap::with_key();
        let k1 = sm.insert(());
        let k2 = sm.insert(());
        let p1 = handle(1, k1);
        let p2 = handle(0, k2);
        let mut cs: ConfigurationSet<2> = ConfigurationSet::new();
        assert!(cs.find_and_destroy(&[p1, p2]).is_err());
    }

    #[test]
    fn uniform_sampling_over_three_tuples() {
        let mut sm: SlotMap<PointKey, ()> = SlotMap::with_key();
        let mut cs: ConfigurationSet<3> = ConfigurationSet::with_bucket_count(16);
        for i in 0..10 {
            let k = sm.insert(());
            cs.add(1.0, [handle(0, k), handle(1, k), handle(2, k)]).unwrap();
            let _ = i;
        }
        assert_eq!(cs.total_count(), 10);
        for n in 0..10 {
            assert!(cs.get_nth(n).is_ok());
        }
        assert!(cs.get_nth(10).is_err());
    }
}
