//! Two-phase symmetric encryption and decryption
//!
//! Implements encryption: b = a·s + e + round(q·m/p)
//!
//! `preprocess` computes the plaintext-independent `a·s + e`; `finalize`
//! adds the scaled message. Decryption computes `round(p·(b - a·s)/q) mod p`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::error::{Result, RlweError};
use crate::math::{ModQ, RnsPoly};

use super::ciphertext::{Ciphertext, PartialCiphertext};
use super::key::SecretKey;
use super::plaintext::Plaintext;
use super::public::PublicPolynomial;

impl SecretKey {
    fn check_public(&self, a: &PublicPolynomial) -> Result<()> {
        self.context().check_parms_id(a.context().parms_id())?;
        if a.is_transposed() {
            return Err(RlweError::TransposedPolynomial);
        }
        Ok(())
    }

    /// `a·s` in coefficient domain.
    fn mul_public(&self, a: &PublicPolynomial) -> RnsPoly {
        let ntt = self.context().ntt();
        let mut prod = a.as_ntt().mul_ntt_domain(self.ntt_form(), ntt);
        prod.from_ntt(ntt);
        prod
    }

    /// Computes `a·s + e` with fresh Gaussian noise from an OS-seeded stream.
    pub fn preprocess(&self, a: &PublicPolynomial) -> Result<PartialCiphertext> {
        self.preprocess_with_rng(a, &mut ChaCha20Rng::from_entropy())
    }

    /// Computes `a·s + e`, drawing the noise from `rng`.
    ///
    /// # Errors
    ///
    /// `ContextMismatch` if `a` was derived under another context,
    /// `TransposedPolynomial` if `a` has been transposed.
    pub fn preprocess_with_rng<R: Rng + ?Sized>(
        &self,
        a: &PublicPolynomial,
        rng: &mut R,
    ) -> Result<PartialCiphertext> {
        self.check_public(a)?;
        let ctx = self.context();

        let mut poly = self.mul_public(a);
        let noise = ctx.gaussian().sample_vec_with(rng, ctx.n());
        poly.add_assign(&RnsPoly::from_signed(&noise, ctx.moduli()), ctx.moduli());

        Ok(PartialCiphertext {
            ctx: ctx.clone(),
            poly,
        })
    }

    /// Adds `round(q·m/p)` to every coefficient of a partial ciphertext.
    pub fn finalize(&self, pt: &Plaintext, partial: &PartialCiphertext) -> Result<Ciphertext> {
        let ctx = self.context();
        ctx.check_parms_id(pt.context().parms_id())?;
        ctx.check_parms_id(partial.ctx.parms_id())?;

        let n = ctx.n();
        let mut poly = partial.poly.clone();
        let mut scaled = vec![0u64; ctx.crt_count()];
        for (i, &m) in pt.values().iter().enumerate() {
            ctx.scale_plaintext(m, &mut scaled);
            let data = poly.as_mut_slice();
            for (j, (&q, &s)) in ctx.moduli().iter().zip(&scaled).enumerate() {
                data[j * n + i] = ModQ::add(data[j * n + i], s, q);
            }
        }

        Ok(Ciphertext::from_poly(ctx, poly))
    }

    /// Encrypts `values` on top of a partial ciphertext.
    ///
    /// The result is truncated to `values.len()` coefficients when fewer
    /// than `n` values are given.
    pub fn encrypt_preprocessed(
        &self,
        values: &[u64],
        partial: &PartialCiphertext,
    ) -> Result<Ciphertext> {
        let pt = Plaintext::from_u64(self.context(), values)?;
        let mut ct = self.finalize(&pt, partial)?;
        if values.len() < self.context().n() {
            ct.truncate(values.len())?;
        }
        Ok(ct)
    }

    /// One-shot encryption under `a`.
    pub fn encrypt(&self, pt: &Plaintext, a: &PublicPolynomial) -> Result<Ciphertext> {
        let partial = self.preprocess(a)?;
        self.finalize(pt, &partial)
    }

    /// Decrypts the `coeff_count` coefficients present in `ct`.
    pub fn decrypt(&self, a: &PublicPolynomial, ct: &Ciphertext) -> Result<Vec<u64>> {
        self.check_public(a)?;
        let ctx = self.context();
        ctx.check_parms_id(ct.context().parms_id())?;

        let a_s = self.mul_public(a);
        let count = ct.coeff_count();
        let data = ct.data();
        let mut residues = vec![0u64; ctx.crt_count()];

        let out = (0..count)
            .map(|i| {
                for (j, &q) in ctx.moduli().iter().enumerate() {
                    residues[j] = ModQ::sub(data[j * count + i], a_s.component(j)[i], q);
                }
                ctx.descale(&residues)
            })
            .collect();
        Ok(out)
    }
}
