//! Dummy (decoy) ciphertext data.
//!
//! Blobs are byte-identical in format to [`crate::Ciphertext::store_data`] and
//! filled with uniform residues, so they cannot be told apart from real
//! ciphertext data without the secret key.

use std::sync::Arc;

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::context::RingContext;
use crate::error::Result;
use crate::rlwe::{data_size_for, seeded_stream, write_data, Seed};

const DUMMY_CONTEXT: &str = "hybrid-rlwe 2024 dummy ciphertext data";

/// Length of a full-size (`n` coefficients) dummy blob.
pub fn dummy_ciphertext_size(ctx: &RingContext) -> usize {
    data_size_for(ctx, ctx.n())
}

/// Samples dummy data for `samples` coefficients: `ceil(samples / n)` blobs,
/// each holding `min(remaining, n)` coefficients.
pub fn store_dummy_ciphertexts(
    ctx: &Arc<RingContext>,
    seed: &Seed,
    samples: usize,
) -> Result<Vec<Vec<u8>>> {
    DummySampler::new(ctx, seed).sample_coefficients(samples)
}

/// A seeded source of dummy ciphertext data.
///
/// The underlying stream is never reset, so successive calls continue where
/// the previous one stopped and two samplers with the same seed produce the
/// same sequence of blobs.
#[derive(Debug)]
pub struct DummySampler {
    ctx: Arc<RingContext>,
    rng: ChaCha20Rng,
}

impl DummySampler {
    pub fn new(ctx: &Arc<RingContext>, seed: &Seed) -> Self {
        Self {
            ctx: Arc::clone(ctx),
            rng: seeded_stream(DUMMY_CONTEXT, seed),
        }
    }

    /// `count` full-size blobs.
    pub fn sample(&mut self, count: usize) -> Result<Vec<Vec<u8>>> {
        debug!(count, "sampling dummy ciphertexts");
        (0..count).map(|_| self.blob(self.ctx.n())).collect()
    }

    /// Blobs covering exactly `samples` coefficients.
    pub fn sample_coefficients(&mut self, samples: usize) -> Result<Vec<Vec<u8>>> {
        let n = self.ctx.n();
        debug!(samples, blobs = samples.div_ceil(n), "sampling dummy coefficients");

        let mut blobs = Vec::with_capacity(samples.div_ceil(n));
        let mut remaining = samples;
        while remaining > 0 {
            let take = remaining.min(n);
            blobs.push(self.blob(take)?);
            remaining -= take;
        }
        Ok(blobs)
    }

    fn blob(&mut self, coeff_count: usize) -> Result<Vec<u8>> {
        let moduli = self.ctx.moduli();
        let mut words = Vec::with_capacity(coeff_count * moduli.len());
        for &q in moduli {
            words.extend((0..coeff_count).map(|_| self.rng.gen_range(0..q)));
        }

        let mut buf = vec![0u8; data_size_for(&self.ctx, coeff_count)];
        write_data(&mut buf, coeff_count, moduli.len(), &words)?;
        Ok(buf)
    }
}
