//! Parameter sets for the RLWE core and the hybrid transform.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RlweError};
use crate::math::gaussian::DEFAULT_SIGMA;

/// Smallest supported ring dimension.
pub const MIN_RING_DIM: usize = 1 << 10;

/// Largest supported ring dimension.
pub const MAX_RING_DIM: usize = 1 << 15;

/// Width of the hybrid LWE modulus `Q = 2^log_q`.
///
/// The width also fixes the RNS basis: one 33-bit prime for 32-bit mode, a
/// 32-bit prime followed by two 33-bit primes for 64-bit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LogQ {
    Bits32,
    Bits64,
}

impl LogQ {
    /// `log2(Q)`
    pub fn bits(self) -> u32 {
        match self {
            LogQ::Bits32 => 32,
            LogQ::Bits64 => 64,
        }
    }

    /// Bit sizes of the RNS primes, in basis order.
    pub fn prime_bit_sizes(self) -> &'static [u32] {
        match self {
            LogQ::Bits32 => &[33],
            LogQ::Bits64 => &[32, 33, 33],
        }
    }

    /// Default ring dimension for this width.
    pub fn default_ring_dim(self) -> usize {
        match self {
            LogQ::Bits32 => 2048,
            LogQ::Bits64 => 4096,
        }
    }
}

impl TryFrom<u32> for LogQ {
    type Error = RlweError;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(LogQ::Bits32),
            64 => Ok(LogQ::Bits64),
            other => Err(RlweError::UnsupportedModulus(other)),
        }
    }
}

impl From<LogQ> for u32 {
    fn from(log_q: LogQ) -> u32 {
        log_q.bits()
    }
}

/// Ring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingParams {
    /// Ring dimension n (power of two)
    pub ring_dim: usize,

    /// Plaintext modulus p
    /// Must be smaller than every RNS prime
    pub p: u64,

    /// Hybrid modulus width, also selects the RNS basis
    pub log_q: LogQ,

    /// Whether to precompute modulus switching tables
    #[serde(default)]
    pub mod_switch: bool,

    /// Standard deviation for Gaussian secret and error sampling
    #[serde(default = "default_sigma")]
    pub sigma: f64,
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

impl RingParams {
    /// 32-bit hybrid mode: n = 2048, p = 2^7
    pub fn hybrid_32() -> Self {
        Self {
            ring_dim: LogQ::Bits32.default_ring_dim(),
            p: 1 << 7,
            log_q: LogQ::Bits32,
            mod_switch: true,
            sigma: DEFAULT_SIGMA,
        }
    }

    /// 64-bit hybrid mode: n = 4096, p = 2^15
    pub fn hybrid_64() -> Self {
        Self {
            ring_dim: LogQ::Bits64.default_ring_dim(),
            p: 1 << 15,
            log_q: LogQ::Bits64,
            mod_switch: true,
            sigma: DEFAULT_SIGMA,
        }
    }

    /// Builds parameters from raw values, rejecting unsupported widths.
    pub fn new(p: u64, ring_dim: usize, log_q: u32, mod_switch: bool) -> Result<Self> {
        let params = Self {
            ring_dim,
            p,
            log_q: LogQ::try_from(log_q)?,
            mod_switch,
            sigma: DEFAULT_SIGMA,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameters that do not depend on the chosen primes.
    ///
    /// With modulus switching on, `p` may be at most `Q/2`.
    /// `p` being smaller than the primes is checked when the context is
    /// built.
    pub fn validate(&self) -> Result<()> {
        if !self.ring_dim.is_power_of_two()
            || !(MIN_RING_DIM..=MAX_RING_DIM).contains(&self.ring_dim)
        {
            return Err(RlweError::InvalidParams(format!(
                "ring_dim must be a power of two in [{}, {}], got {}",
                MIN_RING_DIM, MAX_RING_DIM, self.ring_dim
            )));
        }

        if self.p < 2 {
            return Err(RlweError::InvalidParams(format!(
                "plaintext modulus must be at least 2, got {}",
                self.p
            )));
        }

        // round/lift need at least two words of Z_Q per plaintext step
        let half_q = 1u128 << (self.log_q.bits() - 1);
        if self.mod_switch && self.p as u128 > half_q {
            return Err(RlweError::InvalidParams(format!(
                "plaintext modulus {} is too large for modulus switching to 2^{}",
                self.p,
                self.log_q.bits()
            )));
        }

        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(RlweError::InvalidParams(format!(
                "sigma must be positive, got {}",
                self.sigma
            )));
        }

        Ok(())
    }
}

impl Default for RingParams {
    fn default() -> Self {
        Self::hybrid_32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_valid() {
        assert!(RingParams::hybrid_32().validate().is_ok());
        assert!(RingParams::hybrid_64().validate().is_ok());
        assert_eq!(RingParams::default(), RingParams::hybrid_32());
    }

    #[test]
    fn test_unsupported_log_q() {
        for bits in [0, 16, 48, 128] {
            assert!(matches!(
                RingParams::new(65537, 4096, bits, false),
                Err(RlweError::UnsupportedModulus(b)) if b == bits
            ));
        }
    }

    #[test]
    fn test_invalid_ring_dim() {
        for n in [0, 1000, 512, 1 << 16] {
            assert!(matches!(
                RingParams::new(65537, n, 32, false),
                Err(RlweError::InvalidParams(_))
            ));
        }
    }

    #[test]
    fn test_invalid_plaintext_modulus() {
        assert!(RingParams::new(1, 4096, 32, false).is_err());
        assert!(RingParams::new(2, 4096, 32, false).is_ok());
    }

    #[test]
    fn test_plaintext_modulus_bounded_by_switch_width() {
        assert!(matches!(
            RingParams::new(6_000_000_001, 1024, 32, true),
            Err(RlweError::InvalidParams(_))
        ));
        assert!(RingParams::new((1 << 31) + 1, 1024, 32, true).is_err());
        assert!(RingParams::new(1 << 31, 1024, 32, true).is_ok());
        // without switching only the RNS primes bound p
        assert!(RingParams::new(6_000_000_001, 1024, 32, false).is_ok());
        assert!(RingParams::new(u64::MAX, 1024, 64, true).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let params = RingParams::hybrid_64();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"log_q\":64"));
        let back: RingParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_json_defaults_and_rejection() {
        let params: RingParams =
            serde_json::from_str(r#"{"ring_dim": 4096, "p": 65537, "log_q": 32}"#).unwrap();
        assert!(!params.mod_switch);
        assert_eq!(params.sigma, DEFAULT_SIGMA);

        let bad = serde_json::from_str::<RingParams>(r#"{"ring_dim": 4096, "p": 65537, "log_q": 40}"#);
        assert!(bad.is_err());
    }
}
