//! Seeded RLWE ciphertexts.
//!
//! Only the `b` component is stored; `a` is re-derived from the seed it was
//! encrypted under. Residues are kept in coefficient domain, `coeff_count`
//! per RNS prime, one prime after another.

use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::context::RingContext;
use crate::error::{deserialize_err, Result, RlweError};
use crate::math::RnsPoly;
use crate::wire::{self, ObjectKind, WireReader};

/// Plaintext-independent half of an encryption: `a·s + e` in coefficient
/// domain.
///
/// One partial ciphertext can be finalized with any number of plaintexts
/// sharing the same `(s, a)` pair.
#[derive(Clone, Debug)]
pub struct PartialCiphertext {
    pub(crate) ctx: Arc<RingContext>,
    pub(crate) poly: RnsPoly,
}

impl PartialCiphertext {
    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }
}

/// `b = a·s + e + round(q·m/p) (mod q)` for the first `coeff_count`
/// coefficients.
#[derive(Clone, Debug)]
pub struct Ciphertext {
    ctx: Arc<RingContext>,
    coeff_count: usize,
    /// `data[j * coeff_count + i]` is coefficient `i` modulo prime `j`.
    data: Vec<u64>,
}

impl Ciphertext {
    pub(crate) fn from_poly(ctx: &Arc<RingContext>, poly: RnsPoly) -> Self {
        Self {
            ctx: Arc::clone(ctx),
            coeff_count: poly.dimension(),
            data: poly.into_vec(),
        }
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    /// Coefficients kept per RNS prime.
    pub fn coeff_count(&self) -> usize {
        self.coeff_count
    }

    /// Raw residues, component-major with stride `coeff_count`.
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    /// Length of the full serialized object.
    pub fn size(&self) -> usize {
        ObjectKind::Ciphertext.object_len(self.data.len())
    }

    /// Length of the serialized backing array.
    pub fn data_size(&self) -> usize {
        data_size_for(&self.ctx, self.coeff_count)
    }

    /// Writes the full object (parameters fingerprint included).
    pub fn store(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.size();
        wire::check_capacity(buf, size)?;

        let mut writer = Cursor::new(&mut buf[..size]);
        wire::write_header(&mut writer, ObjectKind::Ciphertext)?;
        writer.write_u64::<LittleEndian>(self.ctx.parms_id())?;
        writer.write_u32::<LittleEndian>(self.ctx.n() as u32)?;
        writer.write_u32::<LittleEndian>(self.coeff_count as u32)?;
        writer.write_u32::<LittleEndian>(self.ctx.crt_count() as u32)?;
        writer.write_u32::<LittleEndian>(0)?;
        wire::write_words(&mut writer, &self.data)?;
        Ok(size)
    }

    /// Writes only the backing array; this is what
    /// [`crate::hybrid::extract_ciphertext_lwe`] consumes.
    pub fn store_data(&self, buf: &mut [u8]) -> Result<usize> {
        write_data(buf, self.coeff_count, self.ctx.crt_count(), &self.data)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size()];
        let _ = self.store(&mut buf);
        buf
    }

    pub fn data_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.data_size()];
        let _ = self.store_data(&mut buf);
        buf
    }

    /// Parses a full object produced by [`Ciphertext::store`].
    pub fn load(ctx: &Arc<RingContext>, bytes: &[u8]) -> Result<Self> {
        let mut reader = WireReader::open(bytes, ObjectKind::Ciphertext)?;

        let parms_id = reader.u64()?;
        if parms_id != ctx.parms_id() {
            return Err(deserialize_err!(
                "parms_id {:016x} does not match context {:016x}",
                parms_id,
                ctx.parms_id()
            ));
        }
        let n = reader.u32()? as usize;
        if n != ctx.n() {
            return Err(deserialize_err!("ring dimension {} != {}", n, ctx.n()));
        }
        let coeff_count = reader.u32()? as usize;
        let moduli_count = reader.u32()? as usize;
        let _reserved = reader.u32()?;

        let data = read_body(ctx, &mut reader, coeff_count, moduli_count)?;
        reader.finish()?;

        Ok(Self {
            ctx: Arc::clone(ctx),
            coeff_count,
            data,
        })
    }

    /// Parses a backing array produced by [`Ciphertext::store_data`].
    pub fn load_data(ctx: &Arc<RingContext>, bytes: &[u8]) -> Result<Self> {
        let (coeff_count, data) = parse_data(ctx, bytes)?;
        Ok(Self {
            ctx: Arc::clone(ctx),
            coeff_count,
            data,
        })
    }

    /// Keeps the first `k` coefficients of every RNS component.
    pub fn truncate(&mut self, k: usize) -> Result<()> {
        if k > self.coeff_count {
            return Err(RlweError::TruncateOutOfRange {
                requested: k,
                available: self.coeff_count,
            });
        }
        if k == self.coeff_count {
            return Ok(());
        }

        let old = self.coeff_count;
        for j in 0..self.ctx.crt_count() {
            self.data.copy_within(j * old..j * old + k, j * k);
        }
        self.data.truncate(k * self.ctx.crt_count());
        self.coeff_count = k;
        Ok(())
    }
}

/// Serialized data-blob length for `coeff_count` coefficients per prime.
pub fn data_size_for(ctx: &RingContext, coeff_count: usize) -> usize {
    ObjectKind::CiphertextData.object_len(coeff_count * ctx.crt_count())
}

pub(crate) fn write_data(
    buf: &mut [u8],
    coeff_count: usize,
    moduli_count: usize,
    words: &[u64],
) -> Result<usize> {
    let size = ObjectKind::CiphertextData.object_len(words.len());
    wire::check_capacity(buf, size)?;

    let mut writer = Cursor::new(&mut buf[..size]);
    wire::write_header(&mut writer, ObjectKind::CiphertextData)?;
    writer.write_u32::<LittleEndian>(coeff_count as u32)?;
    writer.write_u32::<LittleEndian>(moduli_count as u32)?;
    wire::write_words(&mut writer, words)?;
    Ok(size)
}

/// Parses a data blob, returning `(coeff_count, words)`.
pub(crate) fn parse_data(ctx: &RingContext, bytes: &[u8]) -> Result<(usize, Vec<u64>)> {
    let mut reader = WireReader::open(bytes, ObjectKind::CiphertextData)?;
    let coeff_count = reader.u32()? as usize;
    let moduli_count = reader.u32()? as usize;
    let data = read_body(ctx, &mut reader, coeff_count, moduli_count)?;
    reader.finish()?;
    Ok((coeff_count, data))
}

fn read_body(
    ctx: &RingContext,
    reader: &mut WireReader<'_>,
    coeff_count: usize,
    moduli_count: usize,
) -> Result<Vec<u64>> {
    if moduli_count != ctx.crt_count() {
        return Err(deserialize_err!(
            "moduli count {} != {}",
            moduli_count,
            ctx.crt_count()
        ));
    }
    if coeff_count > ctx.n() {
        return Err(deserialize_err!(
            "coefficient count {} exceeds ring dimension {}",
            coeff_count,
            ctx.n()
        ));
    }

    let data = reader.words(coeff_count * moduli_count)?;
    for (j, &q) in ctx.moduli().iter().enumerate() {
        let component = &data[j * coeff_count..(j + 1) * coeff_count];
        if let Some(pos) = component.iter().position(|&w| w >= q) {
            return Err(deserialize_err!("residue {} of prime {} is not reduced", pos, j));
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ct(ctx: &Arc<RingContext>) -> Ciphertext {
        let n = ctx.n();
        let data: Vec<u64> = (0..n * ctx.crt_count()).map(|i| i as u64).collect();
        Ciphertext::from_poly(ctx, RnsPoly::from_raw(data, n, false))
    }

    #[test]
    fn test_sizes() {
        let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
        let ct = sample_ct(&ctx);
        assert_eq!(ct.size(), 8 + 24 + 8 * 3 * 1024);
        assert_eq!(ct.data_size(), 8 + 8 + 8 * 3 * 1024);
        assert_eq!(ct.to_bytes().len(), ct.size());
        assert_eq!(ct.data_bytes().len(), ct.data_size());
    }

    #[test]
    fn test_store_load_roundtrip() {
        let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
        let ct = sample_ct(&ctx);

        let loaded = Ciphertext::load(&ctx, &ct.to_bytes()).unwrap();
        assert_eq!(loaded.data(), ct.data());

        let loaded = Ciphertext::load_data(&ctx, &ct.data_bytes()).unwrap();
        assert_eq!(loaded.data(), ct.data());
        assert_eq!(loaded.coeff_count(), 1024);
    }

    #[test]
    fn test_load_rejects_foreign_and_malformed() {
        let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
        let other = RingContext::from_parts(65537, 2048, 64, false).unwrap();
        let bytes = sample_ct(&ctx).to_bytes();

        assert!(Ciphertext::load(&other, &bytes).is_err());
        assert!(Ciphertext::load(&ctx, &bytes[..bytes.len() - 8]).is_err());
        assert!(Ciphertext::load_data(&ctx, &bytes).is_err());

        let mut extra = bytes.clone();
        extra.push(0);
        assert!(Ciphertext::load(&ctx, &extra).is_err());

        // coeff_count larger than n
        let mut bad = bytes;
        bad[20..24].copy_from_slice(&2048u32.to_le_bytes());
        assert!(matches!(
            Ciphertext::load(&ctx, &bad),
            Err(RlweError::Deserialize(_))
        ));
    }

    #[test]
    fn test_load_rejects_unreduced_residue() {
        let ctx = RingContext::from_parts(65537, 1024, 32, false).unwrap();
        let mut bytes = sample_ct(&ctx).data_bytes();
        bytes[16..24].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(Ciphertext::load_data(&ctx, &bytes).is_err());
    }

    #[test]
    fn test_truncate_relays_components() {
        let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
        let mut ct = sample_ct(&ctx);
        ct.truncate(3).unwrap();
        assert_eq!(ct.coeff_count(), 3);
        assert_eq!(ct.data(), &[0, 1, 2, 1024, 1025, 1026, 2048, 2049, 2050]);
        assert_eq!(ct.data_size(), 8 + 8 + 8 * 9);
    }

    #[test]
    fn test_truncate_edges() {
        let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
        let mut ct = sample_ct(&ctx);
        let before = ct.to_bytes();
        ct.truncate(1024).unwrap();
        assert_eq!(ct.to_bytes(), before);

        assert!(matches!(
            ct.truncate(1025),
            Err(RlweError::TruncateOutOfRange { requested: 1025, available: 1024 })
        ));

        ct.truncate(10).unwrap();
        let once = ct.to_bytes();
        ct.truncate(10).unwrap();
        assert_eq!(ct.to_bytes(), once);

        ct.truncate(0).unwrap();
        assert!(ct.data().is_empty());
    }
}
