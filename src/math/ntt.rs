//! Number-Theoretic Transform (NTT) over an RNS basis.
//!
//! Implements Cooley-Tukey radix-2 NTT for negacyclic convolution over
//! R_q = Z_q[X]/(X^n + 1), one independent transform per RNS prime.
//!
//! # Theory
//!
//! For negacyclic convolution (multiplication modulo X^n + 1), we use a
//! primitive 2n-th root of unity ψ where ψ^n = -1. The NTT evaluates a
//! polynomial at the odd powers of ψ, enabling pointwise multiplication in
//! the evaluation domain.
//!
//! # Layout
//!
//! RNS buffers are laid out component-major: the residues modulo `q_j`
//! occupy `buf[j * n..(j + 1) * n]`.
//!
//! # Montgomery form
//!
//! `forward` converts its input into Montgomery form (`a·2^64 mod q`) and
//! `inverse` converts back, so values in the NTT domain are always in
//! Montgomery form. Sums of NTT-domain values stay consistent because the
//! conversion is linear.

/// Precomputed NTT tables for every prime of an RNS basis.
#[derive(Clone, Debug)]
pub struct NttContext {
    /// Ring dimension (power of two).
    n: usize,
    /// RNS moduli.
    moduli: Vec<u64>,
    /// -q^(-1) mod 2^64 per modulus.
    q_inv_neg: Vec<u64>,
    /// R^2 mod q per modulus, R = 2^64.
    r_squared: Vec<u64>,
    /// Forward twiddle factors in bit-reversed order (Montgomery form).
    psi_powers: Vec<Vec<u64>>,
    /// Inverse twiddle factors in bit-reversed order (Montgomery form).
    psi_inv_powers: Vec<Vec<u64>>,
    /// n^(-1) mod q in Montgomery form.
    n_inv: Vec<u64>,
}

impl NttContext {
    /// Creates NTT tables for the given dimension and moduli.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a power of two, `moduli` is empty, or some
    /// modulus is not ≡ 1 (mod 2n). Callers validate parameters first.
    pub fn with_moduli(n: usize, moduli: &[u64]) -> Self {
        assert!(n.is_power_of_two(), "n must be a power of two");
        assert!(!moduli.is_empty(), "moduli must be non-empty");

        let mut q_inv_neg = Vec::with_capacity(moduli.len());
        let mut r_squared = Vec::with_capacity(moduli.len());
        let mut psi_powers = Vec::with_capacity(moduli.len());
        let mut psi_inv_powers = Vec::with_capacity(moduli.len());
        let mut n_inv = Vec::with_capacity(moduli.len());

        for &q in moduli {
            assert!(q % (2 * n as u64) == 1, "q must be ≡ 1 (mod 2n)");

            let q_inv = Self::compute_q_inv_neg(q);
            let r2 = Self::compute_r_squared(q);

            let psi = Self::find_primitive_root(2 * n as u64, q);
            let psi_mont = Self::to_montgomery(psi, q, r2, q_inv);
            let psi_pow = Self::compute_twiddle_factors(n, psi_mont, q, q_inv, r2);

            let psi_inv = Self::mod_pow(psi, q - 2, q);
            let psi_inv_mont = Self::to_montgomery(psi_inv, q, r2, q_inv);
            let psi_inv_pow = Self::compute_twiddle_factors(n, psi_inv_mont, q, q_inv, r2);

            let n_inv_val = Self::mod_pow(n as u64, q - 2, q);
            let n_inv_mont = Self::to_montgomery(n_inv_val, q, r2, q_inv);

            q_inv_neg.push(q_inv);
            r_squared.push(r2);
            psi_powers.push(psi_pow);
            psi_inv_powers.push(psi_inv_pow);
            n_inv.push(n_inv_mont);
        }

        Self {
            n,
            moduli: moduli.to_vec(),
            q_inv_neg,
            r_squared,
            psi_powers,
            psi_inv_powers,
            n_inv,
        }
    }

    /// Returns the ring dimension.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Returns the RNS moduli.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Number of RNS moduli.
    pub fn crt_count(&self) -> usize {
        self.moduli.len()
    }

    /// Length of a full RNS buffer (`n * crt_count`).
    pub fn buffer_len(&self) -> usize {
        self.n * self.moduli.len()
    }

    /// Forward NTT in place. Input residues must be reduced.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n * crt_count`.
    pub fn forward(&self, coeffs: &mut [u64]) {
        assert_eq!(
            coeffs.len(),
            self.buffer_len(),
            "Input length must match dimension * crt_count"
        );

        for (idx, chunk) in coeffs.chunks_exact_mut(self.n).enumerate() {
            let q = self.moduli[idx];
            let r2 = self.r_squared[idx];
            let q_inv = self.q_inv_neg[idx];
            for c in chunk.iter_mut() {
                *c = Self::to_montgomery(*c, q, r2, q_inv);
            }
            self.forward_inplace_at(chunk, idx);
        }
    }

    fn forward_inplace_at(&self, coeffs: &mut [u64], idx: usize) {
        let n = self.n;
        let q = self.moduli[idx];
        let psi_powers = &self.psi_powers[idx];

        let mut t = n;
        let mut m = 1;

        while m < n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let j2 = j1 + t;
                let w = psi_powers[m + i];

                for j in j1..j2 {
                    let u = coeffs[j];
                    let v = self.montgomery_mul_at(coeffs[j + t], w, idx);

                    coeffs[j] = if u + v >= q { u + v - q } else { u + v };
                    coeffs[j + t] = if u >= v { u - v } else { q - v + u };
                }
            }
            m <<= 1;
        }
    }

    /// Inverse NTT in place; output is in standard (non-Montgomery) form.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n * crt_count`.
    pub fn inverse(&self, coeffs: &mut [u64]) {
        assert_eq!(
            coeffs.len(),
            self.buffer_len(),
            "Input length must match dimension * crt_count"
        );

        for (idx, chunk) in coeffs.chunks_exact_mut(self.n).enumerate() {
            self.inverse_inplace_at(chunk, idx);
            for c in chunk.iter_mut() {
                *c = self.montgomery_mul_at(*c, 1, idx);
            }
        }
    }

    fn inverse_inplace_at(&self, coeffs: &mut [u64], idx: usize) {
        let n = self.n;
        let q = self.moduli[idx];
        let psi_inv_powers = &self.psi_inv_powers[idx];

        let mut t = 1;
        let mut m = n;

        while m > 1 {
            m >>= 1;
            for i in 0..m {
                let j1 = i * 2 * t;
                let w = psi_inv_powers[m + i];

                for j in j1..(j1 + t) {
                    let u = coeffs[j];
                    let v = coeffs[j + t];

                    coeffs[j] = if u + v >= q { u + v - q } else { u + v };
                    let diff = if u >= v { u - v } else { q - v + u };
                    coeffs[j + t] = self.montgomery_mul_at(diff, w, idx);
                }
            }
            t <<= 1;
        }

        for c in coeffs.iter_mut() {
            *c = self.montgomery_mul_at(*c, self.n_inv[idx], idx);
        }
    }

    /// Pointwise product of two NTT-domain buffers.
    ///
    /// # Panics
    ///
    /// Panics if any buffer length differs from `n * crt_count`.
    pub fn pointwise_mul(&self, a: &[u64], b: &[u64], result: &mut [u64]) {
        let len = self.buffer_len();
        assert_eq!(a.len(), len, "Input length must match dimension * crt_count");
        assert_eq!(b.len(), len, "Input length must match dimension * crt_count");
        assert_eq!(result.len(), len, "Output length must match dimension * crt_count");

        for idx in 0..self.crt_count() {
            let range = idx * self.n..(idx + 1) * self.n;
            for ((r, &x), &y) in result[range.clone()]
                .iter_mut()
                .zip(&a[range.clone()])
                .zip(&b[range])
            {
                *r = self.montgomery_mul_at(x, y, idx);
            }
        }
    }

    /// Pointwise multiply-accumulate without reducing the accumulator.
    ///
    /// Each call adds values `< q_j`, so the accumulator holds at most
    /// `u64::MAX / q_j` calls before [`NttContext::reduce`] must run.
    pub fn pointwise_mul_acc_lazy(&self, a: &[u64], b: &[u64], acc: &mut [u64]) {
        let len = self.buffer_len();
        assert_eq!(a.len(), len, "Input length must match dimension * crt_count");
        assert_eq!(b.len(), len, "Input length must match dimension * crt_count");
        assert_eq!(acc.len(), len, "Accumulator length must match dimension * crt_count");

        for idx in 0..self.crt_count() {
            let range = idx * self.n..(idx + 1) * self.n;
            for ((r, &x), &y) in acc[range.clone()]
                .iter_mut()
                .zip(&a[range.clone()])
                .zip(&b[range])
            {
                *r += self.montgomery_mul_at(x, y, idx);
            }
        }
    }

    /// Reduces every residue of an RNS buffer modulo its prime.
    pub fn reduce(&self, coeffs: &mut [u64]) {
        for (chunk, &q) in coeffs.chunks_exact_mut(self.n).zip(&self.moduli) {
            for c in chunk.iter_mut() {
                *c %= q;
            }
        }
    }

    #[inline]
    fn montgomery_mul_at(&self, a: u64, b: u64, idx: usize) -> u64 {
        let q = self.moduli[idx];
        let q_inv_neg = self.q_inv_neg[idx];
        let ab = (a as u128) * (b as u128);
        let m = ((ab as u64).wrapping_mul(q_inv_neg)) as u128;
        let t = ((ab + m * (q as u128)) >> 64) as u64;
        if t >= q {
            t - q
        } else {
            t
        }
    }

    fn to_montgomery(a: u64, q: u64, r_squared: u64, q_inv_neg: u64) -> u64 {
        let ab = (a as u128) * (r_squared as u128);
        let m = ((ab as u64).wrapping_mul(q_inv_neg)) as u128;
        let t = ((ab + m * (q as u128)) >> 64) as u64;
        if t >= q {
            t - q
        } else {
            t
        }
    }

    fn compute_q_inv_neg(q: u64) -> u64 {
        let mut y: u64 = 1;
        for i in 1..64 {
            let yi = y.wrapping_mul(q) & (1u64 << i);
            y |= yi;
        }
        y.wrapping_neg()
    }

    fn compute_r_squared(q: u64) -> u64 {
        let r_mod_q = (1u128 << 64) % (q as u128);
        ((r_mod_q * r_mod_q) % (q as u128)) as u64
    }

    fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
        let mut result = 1u64;
        base %= m;
        while exp > 0 {
            if exp & 1 == 1 {
                result = ((result as u128 * base as u128) % m as u128) as u64;
            }
            exp >>= 1;
            base = ((base as u128 * base as u128) % m as u128) as u64;
        }
        result
    }

    /// Find a primitive n-th root of unity modulo q
    fn find_primitive_root(n: u64, q: u64) -> u64 {
        let exp = (q - 1) / n;

        for g in 2..q {
            let candidate = Self::mod_pow(g, exp, q);
            // ψ^n = 1 and ψ^(n/2) ≠ 1
            if Self::mod_pow(candidate, n, q) == 1 && Self::mod_pow(candidate, n / 2, q) != 1 {
                return candidate;
            }
        }
        unreachable!("q ≡ 1 (mod n) guarantees a primitive n-th root")
    }

    /// Twiddle factors: `factors[k] = ψ^bitrev(k)` in Montgomery form.
    fn compute_twiddle_factors(
        n: usize,
        psi: u64,
        q: u64,
        q_inv_neg: u64,
        r_squared: u64,
    ) -> Vec<u64> {
        let mont_mul = |a: u64, b: u64| -> u64 {
            let ab = (a as u128) * (b as u128);
            let mm = ((ab as u64).wrapping_mul(q_inv_neg)) as u128;
            let t = ((ab + mm * (q as u128)) >> 64) as u64;
            if t >= q {
                t - q
            } else {
                t
            }
        };

        let mut factors = vec![0u64; n];
        let one = Self::to_montgomery(1, q, r_squared, q_inv_neg);
        if n > 1 {
            factors[1] = one;
        }

        for m in 1..n {
            if m.is_power_of_two() {
                // bitrev(m) = n / (2m)
                let exp = n / (2 * m);
                let mut pow = one;
                for _ in 0..exp {
                    pow = mont_mul(pow, psi);
                }
                factors[m] = pow;
            } else {
                // bit reversal is additive over disjoint bits
                let prev_idx = m & (m - 1);
                let step_idx = m & (!m + 1);
                factors[m] = mont_mul(factors[prev_idx], factors[step_idx]);
            }
        }

        factors
    }
}
