//! RLWE secret key.
//!
//! The secret is a polynomial with small Gaussian coefficients. It is kept in
//! two RNS forms: NTT form for encryption and decryption, coefficient form
//! for LWE extraction. Both are always derived from the same state.

use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::context::RingContext;
use crate::error::{deserialize_err, Result, RlweError};
use crate::math::{LweWord, ModQ, RnsPoly};
use crate::wire::{self, ObjectKind, WireReader};

/// Largest absolute secret coefficient accepted by LWE extraction.
///
/// Gaussian secrets stay far below this; a key failing the bound is not a
/// small-norm secret and cannot be read from a single RNS limb.
pub const SECRET_NORM_BOUND: i64 = 1 << 20;

/// RLWE secret key bound to a [`RingContext`].
///
/// # Example
///
/// ```
/// use hybrid_rlwe::{RingContext, SecretKey};
///
/// let ctx = RingContext::from_parts(65537, 1024, 32, false).unwrap();
/// let sk = SecretKey::generate(&ctx);
/// let bytes = sk.to_bytes();
/// assert_eq!(bytes.len(), sk.size());
///
/// let restored = SecretKey::load(&ctx, &bytes).unwrap();
/// assert_eq!(restored.signed_coeffs(), sk.signed_coeffs());
/// ```
#[derive(Clone, Debug)]
pub struct SecretKey {
    ctx: Arc<RingContext>,
    /// Secret in NTT form.
    ntt: RnsPoly,
    /// Secret in coefficient form.
    coeff: RnsPoly,
}

impl SecretKey {
    /// Samples a fresh secret with an OS-seeded ChaCha20 stream.
    pub fn generate(ctx: &Arc<RingContext>) -> Self {
        Self::generate_with_rng(ctx, &mut ChaCha20Rng::from_entropy())
    }

    /// Samples a secret from `rng`.
    pub fn generate_with_rng<R: Rng + ?Sized>(ctx: &Arc<RingContext>, rng: &mut R) -> Self {
        let signed = ctx.gaussian().sample_vec_with(rng, ctx.n());
        let coeff = RnsPoly::from_signed(&signed, ctx.moduli());
        Self::from_coeff_form(ctx, coeff)
    }

    fn from_coeff_form(ctx: &Arc<RingContext>, coeff: RnsPoly) -> Self {
        let mut ntt = coeff.clone();
        ntt.to_ntt(ctx.ntt());
        Self {
            ctx: Arc::clone(ctx),
            ntt,
            coeff,
        }
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    pub(crate) fn ntt_form(&self) -> &RnsPoly {
        &self.ntt
    }

    /// Canonical signed view of the secret, read from the first prime.
    pub fn signed_coeffs(&self) -> Vec<i64> {
        let q0 = self.ctx.moduli()[0];
        self.coeff
            .component(0)
            .iter()
            .map(|&r| ModQ::to_signed(r, q0))
            .collect()
    }

    /// Uncompressed serialized length.
    pub fn size(&self) -> usize {
        ObjectKind::SecretKey.object_len(self.ntt.as_slice().len())
    }

    /// Writes the key into `buf`, returning the number of bytes written.
    pub fn store(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.size();
        wire::check_capacity(buf, size)?;

        let mut writer = Cursor::new(&mut buf[..size]);
        wire::write_header(&mut writer, ObjectKind::SecretKey)?;
        writer.write_u64::<LittleEndian>(self.ctx.parms_id())?;
        writer.write_u32::<LittleEndian>(self.ctx.n() as u32)?;
        writer.write_u32::<LittleEndian>(self.ctx.crt_count() as u32)?;
        wire::write_words(&mut writer, self.ntt.as_slice())?;
        Ok(size)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size()];
        // sized exactly above
        let _ = self.store(&mut buf);
        buf
    }

    /// Parses a serialized key for `ctx`.
    pub fn load(ctx: &Arc<RingContext>, bytes: &[u8]) -> Result<Self> {
        let mut reader = WireReader::open(bytes, ObjectKind::SecretKey)?;

        let parms_id = reader.u64()?;
        if parms_id != ctx.parms_id() {
            return Err(deserialize_err!(
                "parms_id {:016x} does not match context {:016x}",
                parms_id,
                ctx.parms_id()
            ));
        }
        let n = reader.u32()? as usize;
        let moduli_count = reader.u32()? as usize;
        if n != ctx.n() || moduli_count != ctx.crt_count() {
            return Err(deserialize_err!(
                "key shape {}x{} does not match context {}x{}",
                n,
                moduli_count,
                ctx.n(),
                ctx.crt_count()
            ));
        }

        let words = reader.words(n * moduli_count)?;
        reader.finish()?;

        for (j, &q) in ctx.moduli().iter().enumerate() {
            if let Some(pos) = words[j * n..(j + 1) * n].iter().position(|&w| w >= q) {
                return Err(deserialize_err!("residue {} of prime {} is not reduced", pos, j));
            }
        }

        let ntt = RnsPoly::from_raw(words, n, true);
        let mut coeff = ntt.clone();
        coeff.from_ntt(ctx.ntt());

        Ok(Self {
            ctx: Arc::clone(ctx),
            ntt,
            coeff,
        })
    }

    /// Replaces this key with one parsed from `bytes`.
    ///
    /// The replacement is fully parsed before anything is swapped in; on
    /// error the key is unchanged.
    pub fn reload(&mut self, bytes: &[u8]) -> Result<()> {
        let fresh = Self::load(&self.ctx, bytes)?;
        *self = fresh;
        Ok(())
    }

    /// The secret as `n` words of `Z_{2^W::BITS}`.
    ///
    /// Each coefficient is read from the first prime and negative values wrap
    /// around the word width. Requires a small-norm secret: all residues must
    /// agree and stay within [`SECRET_NORM_BOUND`].
    pub fn extract_lwe<W: LweWord>(&self) -> Result<Vec<W>> {
        self.ctx.mod_switch_tables::<W>()?;

        let moduli = self.ctx.moduli();
        let q0 = moduli[0];
        let mut out = Vec::with_capacity(self.ctx.n());

        for (i, &r0) in self.coeff.component(0).iter().enumerate() {
            let s = ModQ::to_signed(r0, q0);
            if s.abs() > SECRET_NORM_BOUND {
                return Err(RlweError::SecretNotLowNorm { index: i });
            }
            for (j, &q) in moduli.iter().enumerate().skip(1) {
                if self.coeff.component(j)[i] != ModQ::from_signed(s, q) {
                    return Err(RlweError::SecretNotLowNorm { index: i });
                }
            }

            let word = if s < 0 {
                W::default().wrapping_sub(W::from_u64_wrapping(q0 - r0))
            } else {
                W::from_u64_wrapping(r0)
            };
            out.push(word);
        }

        Ok(out)
    }
}
