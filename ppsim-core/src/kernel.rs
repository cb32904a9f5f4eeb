use crate::coord::Coord;
use rand::RngCore;

/// A non-negative, typically compactly-supported function of squared
/// distance, used both as an interaction-strength kernel between pairs of
/// points and as a dispersal kernel for offspring placement.
pub trait Kernel: Send + Sync {
    /// Integral of the kernel over the whole domain.
    fn integral(&self) -> f64;

    /// Support radius; zero outside this range.
    fn radius(&self) -> f64;

    fn value_at_squared_distance(&self, d_squared: f64) -> f64;

    /// Samples a torus-wrapped coordinate around `center`.
    fn sample_around(&self, rng: &mut dyn RngCore, center: Coord, u: f64) -> Coord;
}

/// Uniform-density disk kernel: constant value within `radius`, zero beyond it.
#[derive(Clone, Copy, Debug)]
pub struct Tophat {
    integral: f64,
    radius: f64,
    radius_squared: f64,
    value: f64,
}

impl Tophat {
    pub fn new(integral: f64, radius: f64) -> Self {
        let radius_squared = radius * radius;
        Tophat {
            integral,
            radius,
            radius_squared,
            value: integral / (radius_squared * std::f64::consts::PI),
        }
    }
}

impl Kernel for Tophat {
    fn integral(&self) -> f64 {
        self.integral
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn value_at_squared_distance(&self, d_squared: f64) -> f64 {
        if d_squared <= self.radius_squared {
            self.value
        } else {
            0.0
        }
    }

    fn sample_around(&self, rng: &mut dyn RngCore, center: Coord, u: f64) -> Coord {
        use rand::Rng;
        let r: f64 = rng.gen();
        let theta: f64 = rng.gen::<f64>() * 2.0 * std::f64::consts::PI;
        let dx = r.sqrt() * theta.cos() * self.radius;
        let dy = r.sqrt() * theta.sin() * self.radius;
        Coord::new(center.x() + dx, center.y() + dy).wrap(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn value_is_zero_outside_radius() {
        let k = Tophat::new(1.0, 2.0);
        assert!(k.value_at_squared_distance(3.999) > 0.0);
        assert_eq!(k.value_at_squared_distance(4.001), 0.0);
    }

    #[test]
    fn value_integrates_to_given_integral() {
        let k = Tophat::new(3.0, 1.5);
        let area = std::f64::consts::PI * 1.5 * 1.5;
        assert!((k.value_at_squared_distance(0.0) * area - 3.0).abs() < 1e-9);
    }

    #[test]
    fn sampled_points_stay_within_radius_of_unwrapped_center() {
        let k = Tophat::new(1.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(7);
        let u = 1000.0;
        let center = Coord::new(500.0, 500.0);
        for _ in 0..200 {
            let c = k.sample_around(&mut rng, center, u);
            let d2 = center.torus_squared_distance(&c, u);
            assert!(d2 <= 1.0 + 1e-9);
        }
    }
}
