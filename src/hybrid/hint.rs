//! Batched matrix × public-polynomial product ("hint").
//!
//! For a row-major `rows × cols` matrix `D` and public polynomials
//! `a_0, …, a_{k-1}` with `k = ceil(cols / n)`, the LWE matrix of the
//! concatenated ciphertexts is `A = [M(a_0); M(a_1); …]` (one `n × n`
//! negacyclic block per seed). The hint is `H = D · A mod q`, switched to
//! `Z_Q`.
//!
//! Row `r` of `D · A` is `Σ_s d_{r,s} · M(a_s)`, and a row vector times
//! `M(a)` is the polynomial product with `a^T`:
//!
//! ```text
//! H[r] = Σ_s a_s^T · d_{r,s}     (in R_q)
//! ```
//!
//! where `d_{r,s}` is the `s`-th length-`n` slice of row `r`, zero padded.
//! Products are accumulated in NTT form without intermediate reduction.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::context::RingContext;
use crate::error::{Result, RlweError};
use crate::math::LweWord;
use crate::rlwe::{PublicPolynomial, Seed};

use super::modswitch::{mod_switch_into, ModSwitchTables};

/// `rows × n` hint matrix over `Z_{2^W::BITS}`, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint<W> {
    rows: usize,
    n: usize,
    data: Vec<W>,
}

/// 32-bit hint.
pub type Hint32 = Hint<u32>;
/// 64-bit hint.
pub type Hint64 = Hint<u64>;

impl<W: LweWord> Hint<W> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (the ring dimension).
    pub fn cols(&self) -> usize {
        self.n
    }

    pub fn row(&self, r: usize) -> &[W] {
        &self.data[r * self.n..(r + 1) * self.n]
    }

    pub fn as_slice(&self) -> &[W] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<W> {
        self.data
    }
}

/// Per-worker buffers, one RNS polynomial each.
struct HintScratch {
    encoded: Vec<u64>,
    acc: Vec<u64>,
}

impl HintScratch {
    fn new(len: usize) -> Self {
        Self {
            encoded: vec![0; len],
            acc: vec![0; len],
        }
    }
}

/// Computes the hint with rows spread over the rayon thread pool.
///
/// `matrix` is row-major `rows × cols` and `seeds` holds one seed per
/// `n`-column block.
///
/// # Errors
///
/// - `ModSwitchDisabled` / `WidthMismatch` if the context cannot switch to `W`
/// - `DimensionMismatch` if `matrix` or `seeds` do not match `rows × cols`
/// - `InvalidParams` if lazy accumulation over `seeds.len()` blocks could overflow
pub fn compute_hint<W: LweWord>(
    ctx: &Arc<RingContext>,
    matrix: &[u32],
    rows: usize,
    cols: usize,
    seeds: &[Seed],
) -> Result<Hint<W>> {
    let tables = ctx.mod_switch_tables::<W>()?;
    check_dimensions(ctx, matrix, rows, cols, seeds)?;
    let publics = transposed_publics(ctx, seeds);
    let n = ctx.n();

    debug!(rows, cols, seeds = seeds.len(), "computing hint (parallel)");

    let mut data = vec![W::default(); rows * n];
    data.par_chunks_mut(n).enumerate().for_each_init(
        || HintScratch::new(ctx.ntt().buffer_len()),
        |scratch, (r, out)| {
            let row = &matrix[r * cols..(r + 1) * cols];
            compute_row(ctx, tables, &publics, row, scratch, out);
        },
    );

    Ok(Hint { rows, n, data })
}

/// Single-threaded [`compute_hint`].
///
/// Same output, processes rows one after another. Useful for benchmarking
/// parallel vs sequential performance.
pub fn compute_hint_sequential<W: LweWord>(
    ctx: &Arc<RingContext>,
    matrix: &[u32],
    rows: usize,
    cols: usize,
    seeds: &[Seed],
) -> Result<Hint<W>> {
    let tables = ctx.mod_switch_tables::<W>()?;
    check_dimensions(ctx, matrix, rows, cols, seeds)?;
    let publics = transposed_publics(ctx, seeds);
    let n = ctx.n();

    debug!(rows, cols, seeds = seeds.len(), "computing hint (sequential)");

    let mut scratch = HintScratch::new(ctx.ntt().buffer_len());
    let mut data = vec![W::default(); rows * n];
    for (r, out) in data.chunks_mut(n).enumerate() {
        let row = &matrix[r * cols..(r + 1) * cols];
        compute_row(ctx, tables, &publics, row, &mut scratch, out);
    }

    Ok(Hint { rows, n, data })
}

fn check_dimensions(
    ctx: &RingContext,
    matrix: &[u32],
    rows: usize,
    cols: usize,
    seeds: &[Seed],
) -> Result<()> {
    let cells = rows
        .checked_mul(cols)
        .ok_or_else(|| RlweError::InvalidParams(format!("{} x {} matrix overflows", rows, cols)))?;
    if matrix.len() != cells {
        return Err(RlweError::DimensionMismatch {
            expected: cells,
            got: matrix.len(),
        });
    }

    let blocks = cols.div_ceil(ctx.n());
    if seeds.len() != blocks {
        return Err(RlweError::DimensionMismatch {
            expected: blocks,
            got: seeds.len(),
        });
    }

    let headroom = u64::MAX / ctx.basis().max_modulus();
    if seeds.len() as u64 > headroom {
        return Err(RlweError::InvalidParams(format!(
            "{} seeds exceed the accumulator headroom of {}",
            seeds.len(),
            headroom
        )));
    }
    Ok(())
}

fn transposed_publics(ctx: &Arc<RingContext>, seeds: &[Seed]) -> Vec<PublicPolynomial> {
    seeds
        .par_iter()
        .map(|seed| {
            let mut a = PublicPolynomial::derive(ctx, seed);
            a.transpose();
            a
        })
        .collect()
}

fn compute_row<W: LweWord>(
    ctx: &RingContext,
    tables: &ModSwitchTables,
    publics: &[PublicPolynomial],
    row: &[u32],
    scratch: &mut HintScratch,
    out: &mut [W],
) {
    let n = ctx.n();
    let ntt = ctx.ntt();
    scratch.acc.fill(0);

    for (s, a_t) in publics.iter().enumerate() {
        let start = s * n;
        let block = &row[start..row.len().min(start + n)];

        for (j, &q) in ctx.moduli().iter().enumerate() {
            let component = &mut scratch.encoded[j * n..(j + 1) * n];
            for (dst, &d) in component.iter_mut().zip(block) {
                *dst = d as u64 % q;
            }
            component[block.len()..].fill(0);
        }

        ntt.forward(&mut scratch.encoded);
        ntt.pointwise_mul_acc_lazy(&scratch.encoded, a_t.as_ntt().as_slice(), &mut scratch.acc);
    }

    ntt.reduce(&mut scratch.acc);
    ntt.inverse(&mut scratch.acc);
    mod_switch_into(tables, &scratch.acc, n, out);
}
