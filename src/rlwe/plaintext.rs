//! Plaintext vectors in `Z_p^n`.

use std::sync::Arc;

use crate::context::RingContext;
use crate::error::{Result, RlweError};

/// Up to `n` values modulo `p`, zero-padded to `n`.
#[derive(Clone, Debug)]
pub struct Plaintext {
    ctx: Arc<RingContext>,
    values: Vec<u64>,
    /// Number of values supplied by the caller.
    len: usize,
}

impl Plaintext {
    /// All-zero plaintext.
    pub fn new(ctx: &Arc<RingContext>) -> Self {
        Self {
            ctx: Arc::clone(ctx),
            values: vec![0; ctx.n()],
            len: 0,
        }
    }

    pub fn from_u64(ctx: &Arc<RingContext>, values: &[u64]) -> Result<Self> {
        let mut pt = Self::new(ctx);
        pt.set_u64(values)?;
        Ok(pt)
    }

    pub fn from_u32(ctx: &Arc<RingContext>, values: &[u32]) -> Result<Self> {
        let mut pt = Self::new(ctx);
        pt.set_u32(values)?;
        Ok(pt)
    }

    /// Replaces the contents; values are reduced mod `p`.
    pub fn set_u64(&mut self, values: &[u64]) -> Result<()> {
        self.set_with(values.len(), |i| values[i])
    }

    pub fn set_u32(&mut self, values: &[u32]) -> Result<()> {
        self.set_with(values.len(), |i| values[i] as u64)
    }

    fn set_with(&mut self, len: usize, value: impl Fn(usize) -> u64) -> Result<()> {
        let n = self.ctx.n();
        if len > n {
            return Err(RlweError::PlaintextTooLong { len, n });
        }
        let p = self.ctx.p();
        for (i, slot) in self.values.iter_mut().enumerate() {
            *slot = if i < len { value(i) % p } else { 0 };
        }
        self.len = len;
        Ok(())
    }

    pub fn context(&self) -> &Arc<RingContext> {
        &self.ctx
    }

    /// All `n` values, including padding.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Number of values that were set.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
