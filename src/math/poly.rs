//! Polynomials in RNS form over R_q = Z_q[X]/(X^n + 1).
//!
//! A polynomial is stored as one run of `n` residues per RNS prime
//! (component-major, the layout [`NttContext`] works on). Polynomials can be
//! in coefficient domain or NTT domain; the flag is tracked alongside the
//! data.

use rand::Rng;

use super::modular::ModQ;
use super::ntt::NttContext;

/// Polynomial with residues for every prime of an RNS basis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RnsPoly {
    /// Residues, `data[j * n + i]` is coefficient `i` modulo prime `j`.
    data: Vec<u64>,
    n: usize,
    is_ntt: bool,
}

impl RnsPoly {
    /// Create zero polynomial in coefficient domain
    pub fn zero(n: usize, crt_count: usize) -> Self {
        Self {
            data: vec![0; n * crt_count],
            n,
            is_ntt: false,
        }
    }

    /// Wraps raw residues. `data.len()` must be a multiple of `n`.
    pub fn from_raw(data: Vec<u64>, n: usize, is_ntt: bool) -> Self {
        debug_assert_eq!(data.len() % n, 0);
        Self { data, n, is_ntt }
    }

    /// Embeds small signed coefficients into every prime.
    pub fn from_signed(coeffs: &[i64], moduli: &[u64]) -> Self {
        let n = coeffs.len();
        let mut data = Vec::with_capacity(n * moduli.len());
        for &q in moduli {
            data.extend(coeffs.iter().map(|&c| ModQ::from_signed(c, q)));
        }
        Self {
            data,
            n,
            is_ntt: false,
        }
    }

    /// Uniform residues, drawn prime by prime from `rng`.
    pub fn uniform_with_rng<R: Rng + ?Sized>(n: usize, moduli: &[u64], rng: &mut R) -> Self {
        let mut data = Vec::with_capacity(n * moduli.len());
        for &q in moduli {
            data.extend((0..n).map(|_| rng.gen_range(0..q)));
        }
        Self {
            data,
            n,
            is_ntt: false,
        }
    }

    /// Get polynomial dimension
    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn crt_count(&self) -> usize {
        self.data.len() / self.n
    }

    pub fn is_ntt(&self) -> bool {
        self.is_ntt
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.data
    }

    /// Residues modulo prime `j`.
    pub fn component(&self, j: usize) -> &[u64] {
        &self.data[j * self.n..(j + 1) * self.n]
    }

    pub fn component_mut(&mut self, j: usize) -> &mut [u64] {
        &mut self.data[j * self.n..(j + 1) * self.n]
    }

    /// Convert to NTT domain
    pub fn to_ntt(&mut self, ctx: &NttContext) {
        if !self.is_ntt {
            ctx.forward(&mut self.data);
            self.is_ntt = true;
        }
    }

    /// Convert from NTT domain to coefficient domain
    pub fn from_ntt(&mut self, ctx: &NttContext) {
        if self.is_ntt {
            ctx.inverse(&mut self.data);
            self.is_ntt = false;
        }
    }

    /// Pointwise product of two NTT-domain polynomials.
    pub fn mul_ntt_domain(&self, other: &Self, ctx: &NttContext) -> Self {
        debug_assert!(self.is_ntt && other.is_ntt, "operands must be in NTT domain");
        let mut data = vec![0u64; self.data.len()];
        ctx.pointwise_mul(&self.data, &other.data, &mut data);
        Self {
            data,
            n: self.n,
            is_ntt: true,
        }
    }

    /// Coefficient-wise addition; both operands must share a domain.
    pub fn add_assign(&mut self, other: &Self, moduli: &[u64]) {
        debug_assert_eq!(self.is_ntt, other.is_ntt);
        for (j, &q) in moduli.iter().enumerate() {
            let range = j * self.n..(j + 1) * self.n;
            for (a, &b) in self.data[range.clone()].iter_mut().zip(&other.data[range]) {
                *a = ModQ::add(*a, b, q);
            }
        }
    }

    /// Coefficient-wise subtraction; both operands must share a domain.
    pub fn sub_assign(&mut self, other: &Self, moduli: &[u64]) {
        debug_assert_eq!(self.is_ntt, other.is_ntt);
        for (j, &q) in moduli.iter().enumerate() {
            let range = j * self.n..(j + 1) * self.n;
            for (a, &b) in self.data[range.clone()].iter_mut().zip(&other.data[range]) {
                *a = ModQ::sub(*a, b, q);
            }
        }
    }
}
