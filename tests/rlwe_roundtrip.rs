//! RLWE encryption, serialization and reload tests

use std::fs;
use std::sync::{Arc, OnceLock};

use hybrid_rlwe::hybrid::{lift_lwe, round_lwe};
use hybrid_rlwe::{
    Ciphertext, Plaintext, PublicPolynomial, RingContext, RingParams, RlweError, SecretKey,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn test_encrypt_store_load_decrypt_4096() {
    let params = RingParams::new(65537, 4096, 32, false).unwrap();
    let ctx = RingContext::new(params).unwrap();
    assert_eq!(ctx.crt_count(), 1);

    let sk = SecretKey::generate(&ctx);
    let a = PublicPolynomial::derive(&ctx, &[42, 0, 0, 0, 0, 0, 0, 0]);
    let values: Vec<u64> = (1..=4096).collect();
    let pt = Plaintext::from_u64(&ctx, &values).unwrap();
    let ct = sk.encrypt(&pt, &a).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let ct_path = dir.path().join("ct.bin");
    let sk_path = dir.path().join("sk.bin");
    fs::write(&ct_path, ct.to_bytes()).unwrap();
    fs::write(&sk_path, sk.to_bytes()).unwrap();

    let loaded_ct = Ciphertext::load(&ctx, &fs::read(&ct_path).unwrap()).unwrap();
    let loaded_sk = SecretKey::load(&ctx, &fs::read(&sk_path).unwrap()).unwrap();
    assert_eq!(loaded_ct.data(), ct.data());

    // a fresh derivation of the same seed decrypts
    let a_again = PublicPolynomial::derive(&ctx, &[42, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(loaded_sk.decrypt(&a_again, &loaded_ct).unwrap(), values);
}

#[test]
fn test_two_phase_matches_values_at_both_widths() {
    for (p, log_q) in [(1u64 << 7, 32u32), (1 << 15, 64)] {
        let ctx = RingContext::from_parts(p, 1024, log_q, true).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let sk = SecretKey::generate_with_rng(&ctx, &mut rng);
        let a = PublicPolynomial::derive(&ctx, &[1; 8]);

        let partial = sk.preprocess_with_rng(&a, &mut rng).unwrap();
        let first: Vec<u64> = (0..1024).map(|i| i % p).collect();
        let second: Vec<u64> = (0..1024).map(|i| (p - 1 - i % p) % p).collect();

        // one preprocessed partial can be finalized with different plaintexts
        for values in [&first, &second] {
            let pt = Plaintext::from_u64(&ctx, values).unwrap();
            let ct = sk.finalize(&pt, &partial).unwrap();
            assert_eq!(&sk.decrypt(&a, &ct).unwrap(), values);
        }
    }
}

#[test]
fn test_data_blob_truncation() {
    let ctx = RingContext::from_parts(65537, 1024, 64, false).unwrap();
    let sk = SecretKey::generate(&ctx);
    let a = PublicPolynomial::derive(&ctx, &[3; 8]);
    let values: Vec<u64> = (0..1024).map(|i| i * 31 % 65537).collect();
    let ct = sk.encrypt(&Plaintext::from_u64(&ctx, &values).unwrap(), &a).unwrap();

    let mut short = Ciphertext::load_data(&ctx, &ct.data_bytes()).unwrap();
    short.truncate(100).unwrap();
    short.truncate(100).unwrap();
    assert_eq!(short.coeff_count(), 100);
    assert_eq!(sk.decrypt(&a, &short).unwrap(), &values[..100]);

    let reloaded = Ciphertext::load_data(&ctx, &short.data_bytes()).unwrap();
    assert_eq!(reloaded.data(), short.data());

    assert!(matches!(
        short.truncate(101),
        Err(RlweError::TruncateOutOfRange {
            requested: 101,
            available: 100
        })
    ));
}

#[test]
fn test_key_reload_and_mismatch() {
    let ctx = RingContext::from_parts(65537, 1024, 32, false).unwrap();
    let other = RingContext::from_parts(65537, 2048, 32, false).unwrap();

    let sk_a = SecretKey::generate_with_rng(&ctx, &mut ChaCha20Rng::seed_from_u64(1));
    let mut sk_b = SecretKey::generate_with_rng(&ctx, &mut ChaCha20Rng::seed_from_u64(2));
    assert_ne!(sk_a.signed_coeffs(), sk_b.signed_coeffs());

    sk_b.reload(&sk_a.to_bytes()).unwrap();
    assert_eq!(sk_a.signed_coeffs(), sk_b.signed_coeffs());

    // a failed reload leaves the key untouched
    let foreign = SecretKey::generate(&other);
    assert!(matches!(
        sk_b.reload(&foreign.to_bytes()),
        Err(RlweError::Deserialize(_))
    ));
    assert_eq!(sk_a.signed_coeffs(), sk_b.signed_coeffs());

    let a = PublicPolynomial::derive(&other, &[0; 8]);
    assert!(matches!(
        sk_a.preprocess(&a),
        Err(RlweError::ContextMismatch)
    ));

    let mut bytes = sk_a.to_bytes();
    bytes[0] ^= 0xff;
    assert!(matches!(
        SecretKey::load(&ctx, &bytes),
        Err(RlweError::Deserialize(_))
    ));
    assert!(SecretKey::load(&ctx, &sk_a.to_bytes()[..100]).is_err());
}

#[test]
fn test_params_from_json() {
    let json = r#"{"ring_dim": 1024, "p": 257, "log_q": 64}"#;
    let params: RingParams = serde_json::from_str(json).unwrap();
    assert!(!params.mod_switch);
    let ctx = RingContext::new(params).unwrap();
    assert_eq!(ctx.crt_count(), 3);
    assert_eq!(ctx.moduli()[0] >> 31, 1);
}

fn switch_ctx() -> &'static Arc<RingContext> {
    static CTX: OnceLock<Arc<RingContext>> = OnceLock::new();
    CTX.get_or_init(|| RingContext::from_parts(1 << 15, 1024, 64, true).unwrap())
}

proptest! {
    #[test]
    fn prop_lift_round_identity(m in 0u64..(1 << 15)) {
        let ctx = switch_ctx();
        let mut w = vec![m];
        lift_lwe(ctx, &mut w).unwrap();
        round_lwe(ctx, &mut w).unwrap();
        prop_assert_eq!(w[0], m);
    }

    #[test]
    fn prop_round_tolerates_small_noise(m in 0u64..(1 << 15), noise in -(1i64 << 40)..(1i64 << 40)) {
        let ctx = switch_ctx();
        let mut w = vec![m];
        lift_lwe(ctx, &mut w).unwrap();
        w[0] = w[0].wrapping_add(noise as u64);
        round_lwe(ctx, &mut w).unwrap();
        prop_assert_eq!(w[0], m);
    }
}
