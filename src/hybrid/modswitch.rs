//! Modulus switching from the RNS modulus q to Q = 2^32 or 2^64.
//!
//! # Theory
//!
//! For `x mod q` with residues `x_j`, CRT gives
//!
//! ```text
//! x + k·q = Σ_j t_j · (q / q_j),   t_j = x_j · (q/q_j)^{-1} mod q_j
//! ```
//!
//! for some integer `k`. Multiplying by `Q/q`:
//!
//! ```text
//! Q·x/q + k·Q = Σ_j t_j · Q / q_j
//! ```
//!
//! so `Σ_j round(t_j · Q/q_j) mod Q` is `Q·x/q mod Q` up to one rounding per
//! prime. Each ratio `Q/q_j` is kept exactly as `w_j + r_j/q_j` with
//! `Q = w_j·q_j + r_j`, so every term is computed in `u128` with a single
//! final rounding:
//!
//! ```text
//! round(t·Q/q_j) = t·w_j + ⌊(2·t·r_j + q_j) / (2·q_j)⌋
//! ```
//!
//! With `k` primes the rounded sum is within `k/2` of `Q·x/q`; truncating
//! each term instead would leave it up to `k` below, so results can differ
//! from a truncating switch by at most `k`.
//!
//! Round and lift between `Z_Q` and `Z_p` are likewise exact: `p < 2^34` and
//! words are at most 64 bits, so every product fits in 128 bits.

use crate::context::RingContext;
use crate::error::{Result, RlweError};
use crate::math::crt::RnsBasis;
use crate::math::word::LweWord;

/// Per-prime constants for switching to `Q = 2^log_q`.
#[derive(Clone, Debug)]
pub struct ModSwitchTables {
    log_q: u32,
    moduli: Vec<u64>,
    /// (q / q_j)^{-1} mod q_j
    punctured_inv: Vec<u64>,
    /// ⌊Q / q_j⌋
    quotient: Vec<u64>,
    /// Q mod q_j
    remainder: Vec<u64>,
}

impl ModSwitchTables {
    pub fn new(basis: &RnsBasis, log_q: u32) -> Self {
        let big_q = 1u128 << log_q;
        let moduli = basis.moduli().to_vec();
        let quotient = moduli.iter().map(|&q| (big_q / q as u128) as u64).collect();
        let remainder = moduli.iter().map(|&q| (big_q % q as u128) as u64).collect();

        Self {
            log_q,
            punctured_inv: basis.punctured_inv().to_vec(),
            moduli,
            quotient,
            remainder,
        }
    }

    /// `log2(Q)`
    pub fn log_q(&self) -> u32 {
        self.log_q
    }

    /// `Q / 2`
    pub fn half_q(&self) -> u128 {
        1u128 << (self.log_q - 1)
    }

    /// Switches one value given by an iterator over its residues.
    #[inline]
    fn switch<W: LweWord>(&self, residues: impl Iterator<Item = u64>) -> W {
        let mut acc = 0u128;
        for (j, v) in residues.enumerate() {
            let q = self.moduli[j] as u128;
            let t = (v as u128 * self.punctured_inv[j] as u128) % q;
            let term = t * self.quotient[j] as u128
                + (2 * t * self.remainder[j] as u128 + q) / (2 * q);
            acc = acc.wrapping_add(term);
        }
        W::from_u128_wrapping(acc)
    }
}

/// Switches `samples` values from RNS form to `Z_Q`.
///
/// `values` holds one run of `stride` residues per prime; sample `i` is
/// `values[j * stride + i]` for every prime `j`.
pub fn mod_switch<W: LweWord>(
    ctx: &RingContext,
    values: &[u64],
    stride: usize,
    samples: usize,
) -> Result<Vec<W>> {
    let tables = ctx.mod_switch_tables::<W>()?;
    let expected = stride
        .checked_mul(ctx.crt_count())
        .ok_or_else(|| RlweError::InvalidParams(format!("stride {} overflows", stride)))?;
    if values.len() != expected {
        return Err(RlweError::DimensionMismatch {
            expected,
            got: values.len(),
        });
    }
    if samples > stride {
        return Err(RlweError::DimensionMismatch {
            expected: stride,
            got: samples,
        });
    }

    let mut out = vec![W::default(); samples];
    mod_switch_into(tables, values, stride, &mut out);
    Ok(out)
}

/// Unchecked variant writing into `out`; `out.len()` is the sample count.
pub(crate) fn mod_switch_into<W: LweWord>(
    tables: &ModSwitchTables,
    values: &[u64],
    stride: usize,
    out: &mut [W],
) {
    let k = tables.moduli.len();
    for (i, o) in out.iter_mut().enumerate() {
        *o = tables.switch((0..k).map(|j| values[j * stride + i]));
    }
}

/// Scales words from `Z_Q` down to `Z_p`: `b ↦ ⌊(b·p + Q/2) / Q⌋ mod p`.
pub fn round_lwe<W: LweWord>(ctx: &RingContext, values: &mut [W]) -> Result<()> {
    let tables = ctx.mod_switch_tables::<W>()?;
    let p = ctx.p() as u128;
    let half = tables.half_q();
    let shift = tables.log_q();

    for v in values.iter_mut() {
        let b = v.to_u64() as u128;
        let rounded = ((b * p + half) >> shift) % p;
        *v = W::from_u128_wrapping(rounded);
    }
    Ok(())
}

/// Scales words from `Z_p` up to `Z_Q`: `b ↦ ⌊(b·Q + ⌊p/2⌋) / p⌋`, wrapped
/// to the word width.
pub fn lift_lwe<W: LweWord>(ctx: &RingContext, values: &mut [W]) -> Result<()> {
    let tables = ctx.mod_switch_tables::<W>()?;
    let p = ctx.p() as u128;
    let shift = tables.log_q();

    for v in values.iter_mut() {
        let b = v.to_u64() as u128;
        *v = W::from_u128_wrapping(((b << shift) + p / 2) / p);
    }
    Ok(())
}
