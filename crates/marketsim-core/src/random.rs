use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random draws a path simulation consumes.
///
/// Implementations supply uniform(0,1) deviates; normal deviates are derived
/// from them with the Box-Muller transform. Tests can implement this trait
/// with scripted values to make a path fully deterministic.
pub trait RandomSource {
    /// A uniform draw in [0, 1).
    fn next_uniform(&mut self) -> f64;

    /// A draw from Normal(mean, std_dev) via the Box-Muller transform.
    ///
    /// Uniform draws that land exactly on 0 are re-drawn so that `ln(u1)`
    /// stays finite.
    fn next_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let mut u1 = self.next_uniform();
        while u1 == 0.0 {
            u1 = self.next_uniform();
        }
        let mut u2 = self.next_uniform();
        while u2 == 0.0 {
            u2 = self.next_uniform();
        }
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        z0 * std_dev + mean
    }
}

/// Production random source backed by a uniform PRNG.
#[derive(Debug)]
pub struct PrngSource<R: Rng> {
    rng: R,
}

impl PrngSource<StdRng> {
    /// Deterministic source for a given seed.
    pub fn from_seed(seed: u64) -> Self {
        PrngSource {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        PrngSource {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> PrngSource<R> {
    pub fn new(rng: R) -> Self {
        PrngSource { rng }
    }
}

impl<R: Rng> RandomSource for PrngSource<R> {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
