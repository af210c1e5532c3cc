//! Binary wire format for keys and ciphertexts.
//!
//! Every object starts with an 8-byte header:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0 | 4 | magic `HRLW` |
//! | 4 | 1 | version (1) |
//! | 5 | 1 | object kind |
//! | 6 | 1 | compression (0 = none) |
//! | 7 | 1 | reserved (0) |
//!
//! All integers are little-endian. Bodies are described on each
//! [`ObjectKind`] variant.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{deserialize_err, Result, RlweError};

pub const MAGIC: [u8; 4] = *b"HRLW";
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = 8;

const COMPRESSION_NONE: u8 = 0;

/// Kind byte of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjectKind {
    /// `u64 parms_id, u32 n, u32 coeff_count, u32 moduli_count, u32 reserved`,
    /// then `coeff_count · moduli_count` words.
    Ciphertext = 1,
    /// `u32 coeff_count, u32 moduli_count`, then the words.
    CiphertextData = 2,
    /// `u64 parms_id, u32 n, u32 moduli_count`, then `n · moduli_count` words
    /// in NTT form.
    SecretKey = 3,
}

impl ObjectKind {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(ObjectKind::Ciphertext),
            2 => Some(ObjectKind::CiphertextData),
            3 => Some(ObjectKind::SecretKey),
            _ => None,
        }
    }

    /// Bytes between the header and the words.
    pub const fn prefix_len(self) -> usize {
        match self {
            ObjectKind::Ciphertext => 24,
            ObjectKind::CiphertextData => 8,
            ObjectKind::SecretKey => 16,
        }
    }

    /// Total object length for `words` residues.
    pub const fn object_len(self, words: usize) -> usize {
        HEADER_LEN + self.prefix_len() + 8 * words
    }
}

/// Fails with `BufferTooSmall` unless `buf` holds at least `needed` bytes.
pub(crate) fn check_capacity(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(RlweError::BufferTooSmall {
            needed,
            got: buf.len(),
        });
    }
    Ok(())
}

pub(crate) fn write_header<W: Write>(writer: &mut W, kind: ObjectKind) -> Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_u8(VERSION)?;
    writer.write_u8(kind as u8)?;
    writer.write_u8(COMPRESSION_NONE)?;
    writer.write_u8(0)?;
    Ok(())
}

pub(crate) fn write_words<W: Write>(writer: &mut W, words: &[u64]) -> Result<()> {
    for &w in words {
        writer.write_u64::<LittleEndian>(w)?;
    }
    Ok(())
}

/// Reader over a byte slice that reports truncation as a decode error.
pub(crate) struct WireReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> WireReader<'a> {
    /// Validates the header and positions the reader after it.
    pub fn open(bytes: &'a [u8], expected: ObjectKind) -> Result<Self> {
        let mut reader = Self {
            cursor: Cursor::new(bytes),
        };

        let mut magic = [0u8; 4];
        reader
            .cursor
            .read_exact(&mut magic)
            .map_err(|_| deserialize_err!("input shorter than header ({} bytes)", bytes.len()))?;
        if magic != MAGIC {
            return Err(deserialize_err!("bad magic {:02x?}", magic));
        }

        let version = reader.u8()?;
        if version != VERSION {
            return Err(deserialize_err!("unsupported version {}", version));
        }

        let kind_byte = reader.u8()?;
        match ObjectKind::from_byte(kind_byte) {
            Some(kind) if kind == expected => {}
            Some(kind) => {
                return Err(deserialize_err!("expected {:?}, found {:?}", expected, kind));
            }
            None => return Err(deserialize_err!("unknown object kind {}", kind_byte)),
        }

        let compression = reader.u8()?;
        if compression != COMPRESSION_NONE {
            return Err(deserialize_err!("unsupported compression {}", compression));
        }
        let _reserved = reader.u8()?;

        Ok(reader)
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.cursor
            .read_u8()
            .map_err(|e| deserialize_err!("truncated input: {}", e))
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| deserialize_err!("truncated input: {}", e))
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|e| deserialize_err!("truncated input: {}", e))
    }

    /// Reads `count` words, checking the remaining length up front.
    pub fn words(&mut self, count: usize) -> Result<Vec<u64>> {
        let needed = count
            .checked_mul(8)
            .ok_or_else(|| deserialize_err!("word count {} overflows", count))?;
        if self.remaining() < needed {
            return Err(deserialize_err!(
                "expected {} bytes of data, found {}",
                needed,
                self.remaining()
            ));
        }
        let mut out = vec![0u64; count];
        self.cursor
            .read_u64_into::<LittleEndian>(&mut out)
            .map_err(|e| deserialize_err!("truncated input: {}", e))?;
        Ok(out)
    }

    pub fn remaining(&self) -> usize {
        let total = self.cursor.get_ref().len();
        total.saturating_sub(self.cursor.position() as usize)
    }

    /// Fails if any bytes remain.
    pub fn finish(self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(deserialize_err!("{} trailing bytes", extra)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(kind: ObjectKind, words: &[u64]) -> Vec<u8> {
        let mut out = Vec::new();
        write_header(&mut out, kind).unwrap();
        write_words(&mut out, words).unwrap();
        out
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(ObjectKind::CiphertextData, &[]);
        assert_eq!(bytes, vec![b'H', b'R', b'L', b'W', 1, 2, 0, 0]);
    }

    #[test]
    fn test_roundtrip_words() {
        let bytes = encode(ObjectKind::SecretKey, &[1, u64::MAX, 42]);
        let mut reader = WireReader::open(&bytes, ObjectKind::SecretKey).unwrap();
        assert_eq!(reader.words(3).unwrap(), vec![1, u64::MAX, 42]);
        reader.finish().unwrap();
    }

    #[test]
    fn test_rejects_wrong_kind_and_magic() {
        let bytes = encode(ObjectKind::Ciphertext, &[]);
        assert!(matches!(
            WireReader::open(&bytes, ObjectKind::SecretKey),
            Err(RlweError::Deserialize(_))
        ));

        let mut bad = bytes.clone();
        bad[0] = b'X';
        assert!(WireReader::open(&bad, ObjectKind::Ciphertext).is_err());

        let mut bad = bytes.clone();
        bad[4] = 2;
        assert!(WireReader::open(&bad, ObjectKind::Ciphertext).is_err());

        let mut bad = bytes;
        bad[6] = 1;
        assert!(WireReader::open(&bad, ObjectKind::Ciphertext).is_err());
    }

    #[test]
    fn test_truncated_input() {
        assert!(WireReader::open(b"HRL", ObjectKind::Ciphertext).is_err());

        let bytes = encode(ObjectKind::CiphertextData, &[7, 8]);
        let mut reader = WireReader::open(&bytes, ObjectKind::CiphertextData).unwrap();
        assert!(reader.words(3).is_err());
    }

    #[test]
    fn test_trailing_bytes() {
        let bytes = encode(ObjectKind::CiphertextData, &[7]);
        let reader = WireReader::open(&bytes, ObjectKind::CiphertextData).unwrap();
        assert!(reader.finish().is_err());
    }

    #[test]
    fn test_capacity() {
        assert!(check_capacity(&[0u8; 8], 8).is_ok());
        assert!(matches!(
            check_capacity(&[0u8; 7], 8),
            Err(RlweError::BufferTooSmall { needed: 8, got: 7 })
        ));
    }
}
