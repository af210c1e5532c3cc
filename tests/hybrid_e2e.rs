//! End-to-end hybrid correctness tests
//!
//! Encrypt → extract LWE → D·ct − H·s → round = D·m mod p

use std::sync::Arc;

use hybrid_rlwe::hybrid::{
    compute_hint, extract_ciphertext_lwe, extract_key_lwe, lift_lwe, round_lwe,
};
use hybrid_rlwe::{
    store_dummy_ciphertexts, LweWord, PublicPolynomial, RingContext, RlweError, SecretKey, Seed,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn dot<W: LweWord>(lhs: impl Iterator<Item = W>, rhs: &[W]) -> W {
    lhs.zip(rhs)
        .fold(W::default(), |acc, (x, &y)| acc.wrapping_add(x.wrapping_mul(y)))
}

/// Runs the full hybrid pipeline for a `rows × cols` matrix and checks every row.
fn run_hybrid<W: LweWord>(ctx: &Arc<RingContext>, rows: usize, cols: usize, seed: u64) {
    let n = ctx.n();
    let p = ctx.p();
    let blocks = cols.div_ceil(n);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let sk = SecretKey::generate_with_rng(ctx, &mut rng);
    let seeds: Vec<Seed> = (0..blocks).map(|_| rng.gen()).collect();
    let matrix: Vec<u32> = (0..rows * cols).map(|_| rng.gen_range(0..p as u32)).collect();
    let messages: Vec<u64> = (0..cols).map(|_| rng.gen_range(0..p)).collect();

    let mut ct_lwe: Vec<W> = Vec::with_capacity(cols);
    for (s, seed) in seeds.iter().enumerate() {
        let a = PublicPolynomial::derive(ctx, seed);
        let block = &messages[s * n..cols.min((s + 1) * n)];
        let partial = sk.preprocess_with_rng(&a, &mut rng).unwrap();
        let ct = sk.encrypt_preprocessed(block, &partial).unwrap();
        assert_eq!(ct.coeff_count(), block.len());

        // the RLWE layer still decrypts the same ciphertext
        assert_eq!(sk.decrypt(&a, &ct).unwrap(), block);

        ct_lwe.extend(extract_ciphertext_lwe::<W>(ctx, &ct.data_bytes(), block.len()).unwrap());
    }
    assert_eq!(ct_lwe.len(), cols);

    let s_lwe = extract_key_lwe::<W>(ctx, &sk).unwrap();
    let hint = compute_hint::<W>(ctx, &matrix, rows, cols, &seeds).unwrap();
    assert_eq!(hint.rows(), rows);
    assert_eq!(hint.cols(), n);

    let mut decoded: Vec<W> = (0..rows)
        .map(|r| {
            let d_row = &matrix[r * cols..(r + 1) * cols];
            let d_ct = dot(d_row.iter().map(|&d| W::from_u64_wrapping(d as u64)), &ct_lwe);
            d_ct.wrapping_sub(dot(hint.row(r).iter().copied(), &s_lwe))
        })
        .collect();
    round_lwe(ctx, &mut decoded).unwrap();

    for r in 0..rows {
        let expected = matrix[r * cols..(r + 1) * cols]
            .iter()
            .zip(&messages)
            .fold(0u128, |acc, (&d, &m)| (acc + d as u128 * m as u128) % p as u128);
        assert_eq!(decoded[r].to_u64() as u128, expected, "row {} mismatch", r);
    }
}

fn ctx32() -> Arc<RingContext> {
    RingContext::from_parts(1 << 7, 1024, 32, true).unwrap()
}

fn ctx64() -> Arc<RingContext> {
    RingContext::from_parts(1 << 15, 1024, 64, true).unwrap()
}

#[test]
fn test_hybrid_32_single_block() {
    run_hybrid::<u32>(&ctx32(), 8, 1024, 1);
}

#[test]
fn test_hybrid_32_two_blocks() {
    run_hybrid::<u32>(&ctx32(), 8, 2 * 1024, 2);
}

#[test]
fn test_hybrid_32_partial_block() {
    run_hybrid::<u32>(&ctx32(), 8, 2 * 1024 + 5, 3);
}

#[test]
fn test_hybrid_64_single_block() {
    run_hybrid::<u64>(&ctx64(), 8, 1024, 4);
}

#[test]
fn test_hybrid_64_partial_block() {
    run_hybrid::<u64>(&ctx64(), 8, 2 * 1024 + 5, 5);
}

#[test]
fn test_lift_then_round_is_identity() {
    let ctx = ctx32();
    let mut words: Vec<u32> = (0..128).collect();
    lift_lwe(&ctx, &mut words).unwrap();
    assert_eq!(words[1], 1 << 25);
    round_lwe(&ctx, &mut words).unwrap();
    assert_eq!(words, (0..128).collect::<Vec<u32>>());

    let ctx = ctx64();
    let mut words: Vec<u64> = vec![0, 1, 12345, (1 << 15) - 1];
    lift_lwe(&ctx, &mut words).unwrap();
    round_lwe(&ctx, &mut words).unwrap();
    assert_eq!(words, vec![0, 1, 12345, (1 << 15) - 1]);
}

#[test]
fn test_dummy_blobs_extract_like_ciphertexts() {
    let ctx = ctx32();
    let blobs = store_dummy_ciphertexts(&ctx, &[11; 8], 1024 + 17).unwrap();
    assert_eq!(blobs.len(), 2);

    let first = extract_ciphertext_lwe::<u32>(&ctx, &blobs[0], 1024).unwrap();
    assert_eq!(first.len(), 1024);
    let tail = extract_ciphertext_lwe::<u32>(&ctx, &blobs[1], 17).unwrap();
    assert_eq!(tail.len(), 17);

    assert!(matches!(
        extract_ciphertext_lwe::<u32>(&ctx, &blobs[1], 18),
        Err(RlweError::DimensionMismatch { expected: 17, got: 18 })
    ));
}

#[test]
fn test_hybrid_requires_mod_switch() {
    let ctx = RingContext::from_parts(1 << 7, 1024, 32, false).unwrap();
    let sk = SecretKey::generate(&ctx);
    assert!(matches!(
        extract_key_lwe::<u32>(&ctx, &sk),
        Err(RlweError::ModSwitchDisabled)
    ));

    let mut words = vec![0u32; 4];
    assert!(matches!(
        round_lwe(&ctx, &mut words),
        Err(RlweError::ModSwitchDisabled)
    ));

    let ctx = ctx32();
    let sk = SecretKey::generate(&ctx);
    assert!(matches!(
        extract_key_lwe::<u64>(&ctx, &sk),
        Err(RlweError::WidthMismatch { expected: 32, got: 64 })
    ));
}
