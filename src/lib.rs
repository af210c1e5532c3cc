//! hybrid-rlwe: RLWE encryption with an LWE transform over machine words
//!
//! This crate implements the cryptographic core of an RLWE encryption layer
//! used by linear-algebra query protocols (encrypted retrieval, homomorphic
//! matrix-vector products).
//!
//! Key components:
//! - Seeded symmetric RLWE over an RNS basis of NTT-friendly primes, with
//!   two-phase encryption (plaintext-independent preprocessing, cheap finalize)
//! - Hybrid transform: modulus switching to 2^32 / 2^64, LWE extraction of
//!   keys and ciphertexts, and the batched matrix × polynomial "hint"
//! - Uniform dummy ciphertext data for decoy queries

pub mod context;
pub mod dummy;
pub mod error;
pub mod hybrid;
pub mod math;
pub mod params;
pub mod rlwe;
pub mod wire;

pub use context::RingContext;
pub use dummy::{dummy_ciphertext_size, store_dummy_ciphertexts, DummySampler};
pub use error::{Result, RlweError};
pub use hybrid::{
    compute_hint, compute_hint_sequential, extract_ciphertext_lwe, extract_key_lwe, lift_lwe,
    mod_switch, round_lwe, Hint, Hint32, Hint64,
};
pub use math::LweWord;
pub use params::{LogQ, RingParams};
pub use rlwe::{
    Ciphertext, PartialCiphertext, Plaintext, PublicPolynomial, SecretKey, Seed,
    SECRET_NORM_BOUND,
};
