use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A point in the 2D torus domain `[0, U) x [0, U)`.
///
/// Wraps [`nalgebra::Vector2<f64>`] rather than a bespoke pair, so that the
/// rest of the crate can lean on nalgebra's arithmetic instead of
/// reimplementing it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coord(pub Vector2<f64>);

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord(Vector2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn squared_norm(&self) -> f64 {
        self.0.norm_squared()
    }

    /// Wraps both components into `[0, u)`.
    pub fn wrap(self, u: f64) -> Self {
        Coord::new(wrap_coord(self.x(), u), wrap_coord(self.y(), u))
    }

    /// Shortest squared distance between `self` and `other` on a torus of side `u`.
    pub fn torus_squared_distance(&self, other: &Coord, u: f64) -> f64 {
        let dx = (self.x() - other.x()).abs();
        let dy = (self.y() - other.y()).abs();
        let sx = dx.min(u - dx);
        let sy = dy.min(u - dy);
        sx * sx + sy * sy
    }
}

impl std::ops::Add for Coord {
    type Output = Coord;
    fn add(self, rhs: Coord) -> Coord {
        Coord(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Coord {
    type Output = Coord;
    fn sub(self, rhs: Coord) -> Coord {
        Coord(self.0 - rhs.0)
    }
}

/// Wraps a single scalar coordinate into `[0, max)`.
///
/// Only ever called with `x` within one period of the boundary (process
/// kernels have compact support), so a single branch in each direction
/// suffices - this is not a general modulo.
pub fn wrap_coord(x: f64, max: f64) -> f64 {
    if x < 0.0 {
        max + x
    } else if x >= max {
        x - max
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_identity_within_range() {
        assert_eq!(wrap_coord(3.0, 10.0), 3.0);
    }

    #[test]
    fn wrap_negative() {
        assert_eq!(wrap_coord(-1.5, 10.0), 8.5);
    }

    #[test]
    fn wrap_overflow() {
        assert_eq!(wrap_coord(10.5, 10.0), 0.5);
    }

    #[test]
    fn torus_distance_symmetry() {
        let p = Coord::new(0.5, 0.5);
        let q = Coord::new(9.5, 9.5);
        let u = 10.0;
        let d_pq = p.torus_squared_distance(&q, u);
        let d_qp = q.torus_squared_distance(&p, u);
        assert!((d_pq - d_qp).abs() < 1e-12);
        // wrap-around distance should be small, not near the diagonal
        assert!(d_pq < 2.0);
    }

    #[test]
    fn torus_distance_never_exceeds_half_diagonal() {
        let u = 10.0_f64;
        let bound = (u * std::f64::consts::SQRT_2 / 2.0).powi(2);
        let p = Coord::new(0.0, 0.0);
        let q = Coord::new(5.0, 5.0);
        assert!(p.torus_squared_distance(&q, u) <= bound + 1e-9);
    }
}
