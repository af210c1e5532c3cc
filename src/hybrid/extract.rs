//! LWE extraction of secret keys and ciphertexts.

use crate::context::RingContext;
use crate::error::{Result, RlweError};
use crate::math::LweWord;
use crate::rlwe::{parse_data, SecretKey};

use super::modswitch::mod_switch;

/// The secret as an LWE secret over `Z_{2^W::BITS}`.
///
/// Secret coefficients are small, so they are read from a single RNS limb and
/// sign-extended rather than scaled.
pub fn extract_key_lwe<W: LweWord>(ctx: &RingContext, sk: &SecretKey) -> Result<Vec<W>> {
    ctx.mod_switch_tables::<W>()?;
    ctx.check_parms_id(sk.context().parms_id())?;
    sk.extract_lwe()
}

/// Switches the first `samples` coefficients of a serialized ciphertext data
/// blob (see [`crate::Ciphertext::store_data`]) to `Z_{2^W::BITS}`.
pub fn extract_ciphertext_lwe<W: LweWord>(
    ctx: &RingContext,
    data: &[u8],
    samples: usize,
) -> Result<Vec<W>> {
    ctx.mod_switch_tables::<W>()?;
    let (coeff_count, words) = parse_data(ctx, data)?;
    if samples > coeff_count {
        return Err(RlweError::DimensionMismatch {
            expected: coeff_count,
            got: samples,
        });
    }
    mod_switch(ctx, &words, coeff_count, samples)
}
