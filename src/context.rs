//! Shared, read-only ring context.
//!
//! A [`RingContext`] is built once per parameter set and handed around as
//! `Arc<RingContext>`. Keys, ciphertexts and public polynomials remember the
//! fingerprint (`parms_id`) of the context that produced them.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use tracing::debug;

use crate::error::{Result, RlweError};
use crate::hybrid::modswitch::ModSwitchTables;
use crate::math::crt::RnsBasis;
use crate::math::gaussian::GaussianSampler;
use crate::math::ntt::NttContext;
use crate::math::primes::ntt_primes;
use crate::math::word::LweWord;
use crate::math::ModQ;
use crate::params::{LogQ, RingParams};

/// Precomputed tables for one parameter set.
#[derive(Debug)]
pub struct RingContext {
    params: RingParams,
    basis: RnsBasis,
    ntt: NttContext,
    gaussian: GaussianSampler,
    parms_id: u64,
    /// ⌊q/p⌋ mod q_j
    delta: Vec<u64>,
    /// q mod p
    q_mod_p: u64,
    mod_switch: Option<ModSwitchTables>,
}

impl RingContext {
    /// Builds a context, selecting the RNS primes for `params.log_q`.
    pub fn new(params: RingParams) -> Result<Arc<Self>> {
        params.validate()?;
        let n = params.ring_dim;

        let moduli = select_moduli(params.log_q, n)?;
        let basis = RnsBasis::new(&moduli)
            .ok_or_else(|| RlweError::InvalidParams("RNS moduli are not coprime".into()))?;

        if params.p >= basis.min_modulus() {
            return Err(RlweError::InvalidParams(format!(
                "plaintext modulus {} must be smaller than every RNS prime (min {})",
                params.p,
                basis.min_modulus()
            )));
        }

        let ntt = NttContext::with_moduli(n, &moduli);
        let gaussian = GaussianSampler::new(params.sigma)
            .ok_or_else(|| RlweError::InvalidParams(format!("bad sigma {}", params.sigma)))?;

        let delta_big = basis.modulus() / params.p;
        let delta = basis.decompose(&delta_big);
        let q_mod_p = (basis.modulus() % params.p).to_u64().unwrap_or(0);

        let mod_switch = if params.mod_switch {
            Some(ModSwitchTables::new(&basis, params.log_q.bits()))
        } else {
            None
        };

        let parms_id = fingerprint(n, params.p, &moduli);

        debug!(
            n,
            p = params.p,
            log_q = params.log_q.bits(),
            moduli = ?moduli,
            mod_switch = params.mod_switch,
            parms_id = %format!("{:016x}", parms_id),
            "built ring context"
        );

        Ok(Arc::new(Self {
            params,
            basis,
            ntt,
            gaussian,
            parms_id,
            delta,
            q_mod_p,
            mod_switch,
        }))
    }

    /// Builds a context from raw values with the default σ.
    pub fn from_parts(p: u64, n: usize, log_q: u32, mod_switch: bool) -> Result<Arc<Self>> {
        Self::new(RingParams::new(p, n, log_q, mod_switch)?)
    }

    pub fn params(&self) -> &RingParams {
        &self.params
    }

    /// Ring dimension
    pub fn n(&self) -> usize {
        self.params.ring_dim
    }

    /// Plaintext modulus
    pub fn p(&self) -> u64 {
        self.params.p
    }

    pub fn log_q(&self) -> u32 {
        self.params.log_q.bits()
    }

    pub fn moduli(&self) -> &[u64] {
        self.basis.moduli()
    }

    /// Number of RNS primes
    pub fn crt_count(&self) -> usize {
        self.basis.len()
    }

    pub fn mod_switch_enabled(&self) -> bool {
        self.mod_switch.is_some()
    }

    /// Fingerprint of `(n, p, moduli)` embedded in serialized objects.
    pub fn parms_id(&self) -> u64 {
        self.parms_id
    }

    pub fn ntt(&self) -> &NttContext {
        &self.ntt
    }

    pub fn basis(&self) -> &RnsBasis {
        &self.basis
    }

    pub fn gaussian(&self) -> &GaussianSampler {
        &self.gaussian
    }

    /// Residues of `round(q·m/p)` for a plaintext value `m < p`.
    ///
    /// Computed as `Δ·m + round((q mod p)·m / p)` with `Δ = ⌊q/p⌋`.
    pub(crate) fn scale_plaintext(&self, m: u64, out: &mut [u64]) {
        let p = self.params.p as u128;
        let carry = ((self.q_mod_p as u128 * m as u128 + p / 2) / p) as u64;
        for ((o, &q), &d) in out.iter_mut().zip(self.moduli()).zip(&self.delta) {
            *o = ModQ::add(ModQ::mul(d, m % q, q), carry % q, q);
        }
    }

    /// Decodes `round(p·x/q) mod p` from the residues of `x mod q`.
    pub(crate) fn descale(&self, residues: &[u64]) -> u64 {
        let x = self.basis.compose(residues);
        let q = self.basis.modulus();
        let half_q: BigUint = q >> 1u32;
        let rounded = (x * self.params.p + half_q) / q;
        (rounded % self.params.p).to_u64().unwrap_or(0)
    }

    /// Returns the modulus switching tables after checking that they exist
    /// and that `W` matches the context's width.
    pub(crate) fn mod_switch_tables<W: LweWord>(&self) -> Result<&ModSwitchTables> {
        let tables = self.mod_switch.as_ref().ok_or(RlweError::ModSwitchDisabled)?;
        if W::BITS != self.log_q() {
            return Err(RlweError::WidthMismatch {
                expected: self.log_q(),
                got: W::BITS,
            });
        }
        Ok(tables)
    }

    pub(crate) fn check_parms_id(&self, parms_id: u64) -> Result<()> {
        if parms_id != self.parms_id {
            return Err(RlweError::ContextMismatch);
        }
        Ok(())
    }
}

fn select_moduli(log_q: LogQ, n: usize) -> Result<Vec<u64>> {
    let sizes = log_q.prime_bit_sizes();
    let mut moduli = Vec::with_capacity(sizes.len());
    // consecutive equal sizes draw distinct primes from one search
    let mut i = 0;
    while i < sizes.len() {
        let bits = sizes[i];
        let run = sizes[i..].iter().take_while(|&&b| b == bits).count();
        let primes = ntt_primes(bits, run, n).ok_or_else(|| {
            RlweError::InvalidParams(format!("no {}-bit NTT primes for n = {}", bits, n))
        })?;
        moduli.extend(primes);
        i += run;
    }
    Ok(moduli)
}

fn fingerprint(n: usize, p: u64, moduli: &[u64]) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"hybrid-rlwe parms");
    hasher.update(&(n as u64).to_le_bytes());
    hasher.update(&p.to_le_bytes());
    for q in moduli {
        hasher.update(&q.to_le_bytes());
    }
    let hash = hasher.finalize();
    let mut id = [0u8; 8];
    id.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hybrid::modswitch::{lift_lwe, round_lwe};

    #[test]
    fn test_moduli_32() {
        let ctx = RingContext::from_parts(1 << 7, 2048, 32, true).unwrap();
        assert_eq!(ctx.moduli(), &[8589905921]);
        assert_eq!(ctx.n(), 2048);
        assert_eq!(ctx.p(), 128);
        assert!(ctx.mod_switch_enabled());
    }

    #[test]
    fn test_moduli_64() {
        let ctx = RingContext::from_parts(1 << 15, 4096, 64, false).unwrap();
        assert_eq!(ctx.moduli(), &[4294828033, 8589852673, 8589844481]);
        assert!(!ctx.mod_switch_enabled());
        assert!(matches!(
            ctx.mod_switch_tables::<u64>(),
            Err(RlweError::ModSwitchDisabled)
        ));
    }

    #[test]
    fn test_moduli_64_n1024() {
        let ctx = RingContext::from_parts(1 << 15, 1024, 64, true).unwrap();
        assert_eq!(ctx.moduli(), &[4294957057, 8589905921, 8589899777]);
    }

    #[test]
    fn test_unsupported_log_q_is_recoverable() {
        assert!(matches!(
            RingContext::from_parts(65537, 4096, 48, false),
            Err(RlweError::UnsupportedModulus(48))
        ));
    }

    #[test]
    fn test_plaintext_modulus_too_large() {
        assert!(matches!(
            RingContext::from_parts(1 << 33, 4096, 32, false),
            Err(RlweError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_switch_rejects_plaintext_modulus_above_word() {
        assert!(matches!(
            RingContext::from_parts(6_000_000_001, 1024, 32, true),
            Err(RlweError::InvalidParams(_))
        ));

        // largest accepted p still round-trips through lift and round
        let ctx = RingContext::from_parts(1 << 31, 1024, 32, true).unwrap();
        let mut words: Vec<u32> = vec![1, 2, 3, (1 << 31) - 1];
        lift_lwe(&ctx, &mut words).unwrap();
        round_lwe(&ctx, &mut words).unwrap();
        assert_eq!(words, vec![1, 2, 3, (1 << 31) - 1]);
    }

    #[test]
    fn test_width_check() {
        let ctx = RingContext::from_parts(1 << 7, 1024, 32, true).unwrap();
        assert!(ctx.mod_switch_tables::<u32>().is_ok());
        assert!(matches!(
            ctx.mod_switch_tables::<u64>(),
            Err(RlweError::WidthMismatch { expected: 32, got: 64 })
        ));
    }

    #[test]
    fn test_parms_id() {
        let a = RingContext::from_parts(65537, 4096, 32, false).unwrap();
        let b = RingContext::from_parts(65537, 4096, 32, true).unwrap();
        let c = RingContext::from_parts(65537, 2048, 32, false).unwrap();
        let d = RingContext::from_parts(257, 4096, 32, false).unwrap();
        assert_eq!(a.parms_id(), b.parms_id());
        assert_ne!(a.parms_id(), c.parms_id());
        assert_ne!(a.parms_id(), d.parms_id());
    }

    #[test]
    fn test_scale_descale() {
        let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
        let mut residues = vec![0u64; ctx.crt_count()];
        for m in [0u64, 1, 2, 32768, 65536] {
            ctx.scale_plaintext(m, &mut residues);
            assert_eq!(ctx.descale(&residues), m);
        }
    }

    #[test]
    fn test_scale_power_of_two_p() {
        let ctx = RingContext::from_parts(1 << 7, 1024, 32, false).unwrap();
        let q = ctx.moduli()[0] as u128;
        let mut residues = vec![0u64];
        for m in 0..128u64 {
            ctx.scale_plaintext(m, &mut residues);
            let exact = (q * m as u128 + 64) / 128;
            assert_eq!(residues[0] as u128, exact % q);
        }
    }
}
