//! CRT (Chinese Remainder Theorem) helpers over an RNS basis.
//!
//! A value `x mod q`, `q = q_0 · … · q_{k-1}`, is represented by its residues
//! `x mod q_j`. Composition uses the punctured products `q / q_j` and their
//! inverses modulo `q_j`:
//!
//!   x = Σ_j ((x_j · (q/q_j)^{-1}) mod q_j) · (q/q_j)  (mod q)

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use super::modular::ModQ;

/// An ordered RNS basis of pairwise coprime moduli.
#[derive(Clone, Debug)]
pub struct RnsBasis {
    moduli: Vec<u64>,
    /// q = Π q_j
    modulus: BigUint,
    /// q / q_j
    punctured: Vec<BigUint>,
    /// (q / q_j)^{-1} mod q_j
    punctured_inv: Vec<u64>,
}

impl RnsBasis {
    /// Builds the basis. Returns `None` if the moduli are empty or not
    /// pairwise coprime.
    pub fn new(moduli: &[u64]) -> Option<Self> {
        if moduli.is_empty() || moduli.iter().any(|&q| q < 2) {
            return None;
        }
        let modulus: BigUint = moduli.iter().map(|&q| BigUint::from(q)).product();

        let mut punctured = Vec::with_capacity(moduli.len());
        let mut punctured_inv = Vec::with_capacity(moduli.len());
        for &q in moduli {
            let punct = &modulus / q;
            let punct_mod_q = (&punct % q).to_u64()?;
            punctured_inv.push(ModQ::inv(punct_mod_q, q)?);
            punctured.push(punct);
        }

        Some(Self {
            moduli: moduli.to_vec(),
            modulus,
            punctured,
            punctured_inv,
        })
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn len(&self) -> usize {
        self.moduli.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moduli.is_empty()
    }

    /// The composite modulus q.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// `(q / q_j)^{-1} mod q_j` for every prime.
    pub fn punctured_inv(&self) -> &[u64] {
        &self.punctured_inv
    }

    /// Largest prime of the basis.
    pub fn max_modulus(&self) -> u64 {
        self.moduli.iter().copied().max().unwrap_or(0)
    }

    /// Smallest prime of the basis.
    pub fn min_modulus(&self) -> u64 {
        self.moduli.iter().copied().min().unwrap_or(0)
    }

    /// Composes residues (one per prime, all reduced) into `x mod q`.
    pub fn compose(&self, residues: &[u64]) -> BigUint {
        debug_assert_eq!(residues.len(), self.moduli.len());
        let mut acc = BigUint::zero();
        for (j, &r) in residues.iter().enumerate() {
            let q = self.moduli[j];
            let t = ModQ::mul(r, self.punctured_inv[j], q);
            acc += &self.punctured[j] * t;
        }
        acc % &self.modulus
    }

    /// Splits a value into its residues.
    pub fn decompose(&self, value: &BigUint) -> Vec<u64> {
        self.moduli
            .iter()
            .map(|&q| (value % q).to_u64().unwrap_or(0))
            .collect()
    }
}
