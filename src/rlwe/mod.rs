//! RLWE encryption core
//!
//! Symmetric RLWE over the ring R_q = Z_q[X]/(X^n + 1) with q an RNS product
//! of NTT-friendly primes.
//!
//! # Overview
//!
//! - Secret key s is a polynomial sampled from the Gaussian error distribution
//! - The public polynomial a is expanded from a 512-bit seed
//! - A ciphertext stores only b = a·s + e + round(q·m/p); a travels as its seed
//!
//! Encryption is split in two phases so the expensive `a·s + e` can be
//! computed before the message is known.
//!
//! # Example
//!
//! ```
//! use hybrid_rlwe::{Plaintext, PublicPolynomial, RingContext, SecretKey};
//!
//! let ctx = RingContext::from_parts(65537, 1024, 32, false).unwrap();
//! let sk = SecretKey::generate(&ctx);
//! let a = PublicPolynomial::derive(&ctx, &[1, 2, 3, 4, 5, 6, 7, 8]);
//!
//! let partial = sk.preprocess(&a).unwrap();
//! let pt = Plaintext::from_u64(&ctx, &[1, 2, 3]).unwrap();
//! let ct = sk.finalize(&pt, &partial).unwrap();
//!
//! let decrypted = sk.decrypt(&a, &ct).unwrap();
//! assert_eq!(&decrypted[..3], &[1, 2, 3]);
//! ```

mod ciphertext;
mod enc;
mod key;
mod plaintext;
mod public;

pub use ciphertext::{data_size_for, Ciphertext, PartialCiphertext};
pub(crate) use ciphertext::{parse_data, write_data};
pub use key::{SecretKey, SECRET_NORM_BOUND};
pub use plaintext::Plaintext;
pub use public::{PublicPolynomial, Seed};
pub(crate) use public::seeded_stream;
