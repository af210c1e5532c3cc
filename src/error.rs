//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RlweError {
    #[error("unsupported ciphertext modulus: log_q = {0} (expected 32 or 64)")]
    UnsupportedModulus(u32),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("modulus switching is not enabled for this context")]
    ModSwitchDisabled,

    #[error("word width mismatch: context uses {expected}-bit words, got {got}-bit")]
    WidthMismatch { expected: u32, got: u32 },

    #[error("object belongs to a different context")]
    ContextMismatch,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("plaintext has {len} values but the ring holds {n}")]
    PlaintextTooLong { len: usize, n: usize },

    #[error("secret key coefficient {index} is not a small signed value")]
    SecretNotLowNorm { index: usize },

    #[error("cannot truncate to {requested} coefficients, only {available} available")]
    TruncateOutOfRange { requested: usize, available: usize },

    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    #[error("deserialization failed: {0}")]
    Deserialize(String),

    #[error("public polynomial is transposed")]
    TransposedPolynomial,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RlweError>;

/// Create a `RlweError::Deserialize` with format string support
macro_rules! deserialize_err {
    ($($arg:tt)*) => {
        $crate::error::RlweError::Deserialize(format!($($arg)*))
    };
}

pub(crate) use deserialize_err;
