use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The random draws the simulation consumes.
///
/// All randomness flows through a single sampler in a fixed order, so a
/// seeded run replays the exact same draw stream. Probabilities are trusted
/// to lie in `[0, 1]`; the driver validates them before they get here.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Creates a sampler with a fixed seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Sampler {
        Sampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a sampler seeded from the operating system.
    pub fn from_entropy() -> Sampler {
        Sampler {
            rng: StdRng::from_entropy(),
        }
    }

    /// Draws a uniform integer in `[0, bound)`. `bound` must be positive.
    pub fn below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    /// Draws `true` with the given probability.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }

    /// Draws from a Poisson distribution with the given mean.
    ///
    /// Knuth's multiplication method; fine for the small means terrain
    /// seeding works with.
    pub fn poisson(&mut self, mean: f64) -> u32 {
        let limit = (-mean).exp();
        let mut product: f64 = self.rng.gen();
        let mut draws = 0;
        while product > limit {
            draws += 1;
            product *= self.rng.gen::<f64>();
        }
        draws
    }
}
