use num_traits::Zero;
use std::ops::{Add, Sub};

/// A complete binary segment tree over `codes` slots, grouped into
/// `2^depth` leaves, each leaf covering `range_length` consecutive codes.
///
/// Supports O(depth) weighted increments and O(depth) "find the leaf whose
/// predecessors sum to at least this much weight" queries. Not a Fenwick
/// tree: a query resolves to a *bucket*, since the leaves group multiple
/// codes with varying membership, not a single scalar position.
#[derive(Clone, Debug)]
pub struct Accumulator<W> {
    codes: usize,
    depth: u32,
    range_length: usize,
    leaves_start_at: usize,
    max_value: usize,
    nodes: Vec<W>,
}

impl<W> Accumulator<W>
where
    W: Copy + Zero + Add<Output = W> + Sub<Output = W> + PartialOrd,
{
    pub fn new(codes: usize, depth: u32) -> Self {
        let leaves = 1usize << depth;
        let range_length = (codes + leaves - 1) / leaves;
        let max_value = range_length * leaves;
        let leaves_start_at = leaves - 1;
        Accumulator {
            codes,
            depth,
            range_length,
            leaves_start_at,
            max_value,
            nodes: vec![W::zero(); 2 * leaves - 1],
        }
    }

    #[inline]
    fn left_child(index: usize) -> usize {
        2 * index + 1
    }

    #[inline]
    fn right_child(index: usize) -> usize {
        2 * (index + 1)
    }

    #[inline]
    fn is_leaf(&self, index: usize) -> bool {
        index >= self.leaves_start_at
    }

    /// Adds `weight` to the leaf covering `code`, and to every ancestor.
    pub fn increment(&mut self, code: usize, weight: W) {
        let mut index = 0;
        let mut min = 0usize;
        let mut max = self.max_value;
        self.nodes[index] = self.nodes[index] + weight;
        while !self.is_leaf(index) {
            let mid = (min + max) / 2;
            if code < mid {
                index = Self::left_child(index);
                max = mid;
            } else {
                index = Self::right_child(index);
                min = mid;
            }
            self.nodes[index] = self.nodes[index] + weight;
        }
    }

    /// Finds the smallest leaf whose predecessor leaves together hold at
    /// least `weight_to_skip` weight. Returns `(leaf_start_code, remaining)`
    /// where `remaining` is how much weight is still to be skipped once the
    /// caller starts scanning from that code.
    pub fn find_start_location(&self, weight_to_skip: W) -> (usize, W) {
        let mut index = 0usize;
        let mut remaining = weight_to_skip;
        while !self.is_leaf(index) {
            let lc = Self::left_child(index);
            if self.nodes[lc] >= remaining {
                index = lc;
            } else {
                remaining = remaining - self.nodes[lc];
                index = Self::right_child(index);
            }
        }
        let start_location = (index - self.leaves_start_at) * self.range_length;
        (start_location, remaining)
    }

    pub fn total(&self) -> W {
        self.nodes[0]
    }

    pub fn leaves(&self) -> &[W] {
        &self.nodes[self.leaves_start_at..]
    }

    pub fn codes(&self) -> usize {
        self.codes
    }

    pub fn range_length(&self) -> usize {
        self.range_length
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_increment_updates_root() {
        let mut a: Accumulator<i64> = Accumulator::new(100, 3);
        a.increment(5, 7);
        assert_eq!(a.total(), 7);
    }

    #[test]
    fn increment_then_negate_restores_state() {
        let mut a: Accumulator<i64> = Accumulator::new(100, 3);
        let before = a.leaves().to_vec();
        a.increment(42, 3);
        a.increment(42, -3);
        assert_eq!(a.leaves(), before.as_slice());
        assert_eq!(a.total(), 0);
    }

    /// S3 from the testable-properties list: with 100 codes at depth 3
    /// (range_length=13, 8 leaves), incrementing every code by 1 must make
    /// find_start_location(k) resolve to (k/13, k%13) for every k in [0,100).
    #[test]
    fn find_start_location_matches_uniform_fill() {
        let mut a: Accumulator<i64> = Accumulator::new(100, 3);
        assert_eq!(a.range_length(), 13);
        for code in 0..100 {
            a.increment(code, 1);
        }
        for k in 0..100i64 {
            let (bucket, remaining) = a.find_start_location(k);
            assert_eq!(bucket, (k as usize / 13) * 13);
            assert_eq!(remaining, k % 13);
        }
    }

    #[test]
    fn find_start_location_respects_bucket_boundaries() {
        let mut a: Accumulator<i64> = Accumulator::new(8, 3);
        for code in 0..8 {
            a.increment(code, 1);
        }
        for k in 0..8i64 {
            let (bucket, remaining) = a.find_start_location(k);
            assert_eq!(bucket, k as usize);
            assert_eq!(remaining, 0);
        }
    }
}
