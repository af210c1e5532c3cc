//! Discrete Gaussian sampling
//!
//! Provides a rejection sampler for the discrete Gaussian over Z, used for
//! secret keys and encryption noise.

use rand::Rng;

/// Default Gaussian standard deviation
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Samples are rejected beyond this many standard deviations.
const TAILCUT_SIGMAS: f64 = 6.0;

/// Discrete Gaussian sampler over Z using rejection sampling.
///
/// The acceptance probabilities `exp(-x²/2σ²)` are tabulated once for
/// `x ∈ [0, tailcut]`. The sampler itself holds no randomness; callers pass
/// an RNG to [`GaussianSampler::sample_with`].
#[derive(Clone, Debug)]
pub struct GaussianSampler {
    /// Standard deviation σ
    sigma: f64,
    /// Largest absolute value that can be produced
    tailcut: i64,
    /// Acceptance probability indexed by |x|
    accept: Vec<f64>,
}

impl GaussianSampler {
    /// Create a sampler with the given standard deviation.
    ///
    /// Returns `None` for a non-finite or non-positive σ.
    pub fn new(sigma: f64) -> Option<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return None;
        }
        let tailcut = (sigma * TAILCUT_SIGMAS).ceil() as i64;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let accept = (0..=tailcut)
            .map(|x| (-((x * x) as f64) / two_sigma_sq).exp())
            .collect();

        Some(Self {
            sigma,
            tailcut,
            accept,
        })
    }

    /// Get the standard deviation
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Largest absolute value this sampler can return.
    pub fn tailcut(&self) -> i64 {
        self.tailcut
    }

    /// Sample a single signed value from D_σ.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        loop {
            let x = rng.gen_range(-self.tailcut..=self.tailcut);
            let u: f64 = rng.gen();
            if u < self.accept[x.unsigned_abs() as usize] {
                return x;
            }
        }
    }

    /// Sample `len` signed values.
    pub fn sample_vec_with<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> Vec<i64> {
        (0..len).map(|_| self.sample_with(rng)).collect()
    }
}
