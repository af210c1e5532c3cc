//! Seed-derived public polynomial `a`.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::context::RingContext;
use crate::math::{ModQ, RnsPoly};

/// 512-bit seed from which a public polynomial is expanded.
pub type Seed = [u64; 8];

const PUBLIC_POLY_CONTEXT: &str = "hybrid-rlwe 2024 public polynomial a";

/// Expands a seed into a ChaCha20 stream keyed by a domain-separated
/// blake3 derivation of the seed bytes.
pub(crate) fn seeded_stream(context: &str, seed: &Seed) -> ChaCha20Rng {
    let mut bytes = [0u8; 64];
    for (chunk, word) in bytes.chunks_exact_mut(8).zip(seed) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    ChaCha20Rng::from_seed(blake3::derive_key(context, &bytes))
}

/// Public ring element in NTT form.
///
/// `a` is a pure function of the seed and the context; only the seed needs to
/// travel with a ciphertext.
#[derive(Clone, Debug)]
pub struct PublicPolynomial {
    ctx: Arc<RingContext>,
    poly: RnsPoly,
    transposed: bool,
}

impl PublicPolynomial {
    /// Derives `a` from `seed`: uniform residues per prime, then forward NTT.
    pub fn derive(ctx: &Arc<RingContext>, seed: &Seed) -> Self {
        let mut rng = seeded_stream(PUBLIC_POLY_CONTEXT, seed);
        let mut poly = RnsPoly::uniform_with_rng(ctx.n(), ctx.moduli(), &mut rng);
        poly.to_ntt(ctx.ntt());

        Self {
            ctx: Arc::clone(ctx),
            poly,
            transposed: false,
        }
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    /// NTT-domain residues.
    pub fn as_ntt(&self) -> &RnsPoly {
        &self.poly
    }

    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Coefficient-domain residues.
    pub fn coefficients(&self) -> RnsPoly {
        let mut poly = self.poly.clone();
        poly.from_ntt(self.ctx.ntt());
        poly
    }

    /// Replaces `a` with `a^T`, the element whose negacyclic multiplication
    /// matrix is the transpose of `a`'s.
    ///
    /// In coefficients: `a_0` is fixed, `a_j ↦ -a_{n-j}` for `j ≥ 1`
    /// (so `a_{n/2} ↦ -a_{n/2}`). Applying it twice restores `a`.
    pub fn transpose(&mut self) {
        let ntt = self.ctx.ntt();
        let n = self.ctx.n();
        self.poly.from_ntt(ntt);

        for (j, &q) in self.ctx.moduli().iter().enumerate() {
            let coeffs = self.poly.component_mut(j);
            for i in 1..n / 2 {
                let lo = coeffs[i];
                let hi = coeffs[n - i];
                coeffs[i] = ModQ::negate(hi, q);
                coeffs[n - i] = ModQ::negate(lo, q);
            }
            coeffs[n / 2] = ModQ::negate(coeffs[n / 2], q);
        }

        self.poly.to_ntt(ntt);
        self.transposed = !self.transposed;
    }
}
