//! Hybrid transform engine: RLWE to LWE over `Z_{2^32}` / `Z_{2^64}`.
//!
//! A downstream matrix-vector protocol works on plain LWE samples modulo a
//! machine word. This module produces everything it needs from the RLWE
//! core:
//!
//! - [`extract_ciphertext_lwe`]: ciphertext coefficients switched from `q` to `Q`
//! - [`extract_key_lwe`]: the secret as an LWE secret modulo `Q`
//! - [`compute_hint`]: `D · A` for a plaintext matrix `D` and the seeded `A`
//! - [`round_lwe`] / [`lift_lwe`]: scaling between `Z_Q` and `Z_p`
//!
//! Every entry point is generic over the word type and requires a context
//! built with modulus switching enabled for the matching width.
//!
//! # Example
//!
//! ```
//! use hybrid_rlwe::hybrid::{compute_hint, extract_key_lwe};
//! use hybrid_rlwe::{RingContext, SecretKey};
//!
//! let ctx = RingContext::from_parts(1 << 7, 1024, 32, true).unwrap();
//! let sk = SecretKey::generate(&ctx);
//! let s = extract_key_lwe::<u32>(&ctx, &sk).unwrap();
//! assert_eq!(s.len(), 1024);
//!
//! let matrix = vec![1u32; 4 * 1024];
//! let hint = compute_hint::<u32>(&ctx, &matrix, 4, 1024, &[[0u64; 8]]).unwrap();
//! assert_eq!(hint.as_slice().len(), 4 * 1024);
//! ```

pub mod extract;
pub mod hint;
pub mod modswitch;

pub use extract::{extract_ciphertext_lwe, extract_key_lwe};
pub use hint::{compute_hint, compute_hint_sequential, Hint, Hint32, Hint64};
pub use modswitch::{lift_lwe, mod_switch, round_lwe, ModSwitchTables};
