//! hint-bench: times the hybrid hint computation and checks a full
//! encrypt → extract → decode pipeline.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use eyre::{eyre, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use hybrid_rlwe::hybrid::{
    compute_hint, compute_hint_sequential, extract_ciphertext_lwe, extract_key_lwe, round_lwe,
};
use hybrid_rlwe::{
    LogQ, LweWord, PublicPolynomial, RingContext, RingParams, SecretKey, Seed,
};

#[derive(Parser)]
#[command(name = "hint-bench")]
#[command(about = "Benchmark the hybrid RLWE hint and verify decoding")]
#[command(version)]
struct Args {
    /// JSON file with ring parameters (overrides --log-q / --ring-dim / --p)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Hybrid modulus width (32 or 64)
    #[arg(long, default_value = "32")]
    log_q: u32,

    /// Ring dimension (defaults to 2048 for 32-bit, 4096 for 64-bit)
    #[arg(long)]
    ring_dim: Option<usize>,

    /// Plaintext modulus (defaults to 2^7 for 32-bit, 2^15 for 64-bit)
    #[arg(long)]
    p: Option<u64>,

    /// Matrix rows
    #[arg(long, default_value = "256")]
    rows: usize,

    /// Matrix columns (defaults to 2n)
    #[arg(long)]
    cols: Option<usize>,

    /// Also run the sequential hint for comparison
    #[arg(long)]
    sequential: bool,

    /// Skip the encrypt/extract/decode correctness check
    #[arg(long)]
    no_verify: bool,

    /// Random seed for deterministic runs (optional)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let params = load_params(&args)?;

    info!("Hybrid RLWE hint benchmark");
    info!(
        "n = {}, p = {}, log_q = {}",
        params.ring_dim,
        params.p,
        params.log_q.bits()
    );

    let ctx = RingContext::new(params).wrap_err("Failed to build ring context")?;
    info!("RNS moduli: {:?}", ctx.moduli());

    match ctx.log_q() {
        32 => run::<u32>(&args, &ctx),
        64 => run::<u64>(&args, &ctx),
        other => Err(eyre!("Unsupported log_q {}", other)),
    }
}

fn load_params(args: &Args) -> Result<RingParams> {
    let mut params = match &args.params {
        Some(path) => {
            let json = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<RingParams>(&json)
                .wrap_err_with(|| format!("Failed to parse {}", path.display()))?
        }
        None => {
            let mut params = match LogQ::try_from(args.log_q)? {
                LogQ::Bits32 => RingParams::hybrid_32(),
                LogQ::Bits64 => RingParams::hybrid_64(),
            };
            if let Some(n) = args.ring_dim {
                params.ring_dim = n;
            }
            if let Some(p) = args.p {
                params.p = p;
            }
            params
        }
    };

    if !params.mod_switch {
        warn!("Enabling modulus switching (required for the hint)");
        params.mod_switch = true;
    }
    params.validate().wrap_err("Invalid parameters")?;
    Ok(params)
}

fn run<W: LweWord>(args: &Args, ctx: &Arc<RingContext>) -> Result<()> {
    let n = ctx.n();
    let p = ctx.p();
    let rows = args.rows;
    let cols = args.cols.unwrap_or(2 * n);
    let blocks = cols.div_ceil(n);

    let mut rng = match args.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let matrix_bound = u32::try_from(p).unwrap_or(u32::MAX);
    let matrix: Vec<u32> = (0..rows * cols).map(|_| rng.gen_range(0..matrix_bound)).collect();
    let seeds: Vec<Seed> = (0..blocks).map(|_| rng.gen()).collect();
    info!("Matrix: {} x {} ({} seeds)", rows, cols, blocks);

    let start = Instant::now();
    let hint = compute_hint::<W>(ctx, &matrix, rows, cols, &seeds)?;
    let elapsed = start.elapsed();
    info!(
        "compute_hint: {:.2?} ({:.2?} per row)",
        elapsed,
        elapsed / rows.max(1) as u32
    );

    if args.sequential {
        let start = Instant::now();
        let seq = compute_hint_sequential::<W>(ctx, &matrix, rows, cols, &seeds)?;
        info!("compute_hint_sequential: {:.2?}", start.elapsed());
        if seq != hint {
            return Err(eyre!("Parallel and sequential hints differ"));
        }
    }

    if args.no_verify {
        return Ok(());
    }

    info!("Encrypting {} coefficients...", cols);
    let verify_start = Instant::now();
    let sk = SecretKey::generate_with_rng(ctx, &mut rng);
    let messages: Vec<u64> = (0..cols).map(|_| rng.gen_range(0..p)).collect();

    let pb = ProgressBar::new(blocks as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut ct_lwe: Vec<W> = Vec::with_capacity(cols);
    for (s, seed) in seeds.iter().enumerate() {
        let a = PublicPolynomial::derive(ctx, seed);
        let block = &messages[s * n..cols.min((s + 1) * n)];
        let partial = sk.preprocess_with_rng(&a, &mut rng)?;
        let ct = sk.encrypt_preprocessed(block, &partial)?;
        ct_lwe.extend(extract_ciphertext_lwe::<W>(ctx, &ct.data_bytes(), block.len())?);
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    let s_lwe = extract_key_lwe::<W>(ctx, &sk)?;

    let mut decoded: Vec<W> = (0..rows)
        .map(|r| {
            let d_row = &matrix[r * cols..(r + 1) * cols];
            let d_ct = dot(d_row.iter().map(|&d| W::from_u64_wrapping(d as u64)), &ct_lwe);
            let h_s = dot(hint.row(r).iter().copied(), &s_lwe);
            d_ct.wrapping_sub(h_s)
        })
        .collect();
    round_lwe(ctx, &mut decoded)?;

    let mismatches = (0..rows)
        .filter(|&r| {
            let d_row = &matrix[r * cols..(r + 1) * cols];
            let expected = d_row
                .iter()
                .zip(&messages)
                .fold(0u128, |acc, (&d, &m)| (acc + d as u128 * m as u128) % p as u128);
            decoded[r].to_u64() as u128 != expected
        })
        .count();

    info!("Verification time: {:.2?}", verify_start.elapsed());
    if mismatches > 0 {
        return Err(eyre!("{} of {} rows decoded incorrectly", mismatches, rows));
    }
    info!("All {} rows decoded correctly", rows);
    Ok(())
}

fn dot<W: LweWord>(lhs: impl Iterator<Item = W>, rhs: &[W]) -> W {
    lhs.zip(rhs)
        .fold(W::default(), |acc, (x, &y)| acc.wrapping_add(x.wrapping_mul(y)))
}
