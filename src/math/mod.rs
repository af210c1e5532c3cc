//! Mathematical primitives.
//!
//! - **Modular arithmetic** over word-sized primes
//! - **NTT-friendly prime selection**
//! - **Number-Theoretic Transform (NTT)** over an RNS basis, Montgomery form
//! - **RNS/CRT basis** with big-integer composition
//! - **RNS polynomials** over R_q = Z_q[X]/(X^n + 1)
//! - **Discrete Gaussian sampling** for secrets and noise
//! - **Fixed-width LWE words** for `Z_{2^32}` and `Z_{2^64}`
//!
//! # Example
//!
//! ```
//! use hybrid_rlwe::math::{ntt_primes, NttContext, RnsPoly};
//!
//! let moduli = ntt_primes(33, 2, 1024).unwrap();
//! let ctx = NttContext::with_moduli(1024, &moduli);
//! let mut poly = RnsPoly::from_signed(&vec![1i64; 1024], &moduli);
//! poly.to_ntt(&ctx);
//! assert!(poly.is_ntt());
//! ```

pub mod crt;
pub mod gaussian;
pub mod modular;
pub mod ntt;
pub mod poly;
pub mod primes;
pub mod word;

pub use crt::RnsBasis;
pub use gaussian::{GaussianSampler, DEFAULT_SIGMA};
pub use modular::ModQ;
pub use ntt::NttContext;
pub use poly::RnsPoly;
pub use primes::{is_prime, ntt_primes};
pub use word::LweWord;
