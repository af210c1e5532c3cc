//! NTT-friendly prime selection.
//!
//! A prime `q` supports a negacyclic NTT of size `n` when `q ≡ 1 (mod 2n)`.
//! Primes are chosen deterministically: the largest primes of the requested
//! bit size satisfying the congruence, in decreasing order.

use super::modular::ModQ;

/// Witnesses that make Miller-Rabin deterministic for all 64-bit inputs.
const MR_WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Deterministic Miller-Rabin primality test for `u64`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &MR_WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'witness: for &a in &MR_WITNESSES {
        let mut x = ModQ::pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = ModQ::mul(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Returns the `count` largest `bit_size`-bit primes congruent to 1 mod `2n`.
///
/// Returns `None` if the bit size is out of range or not enough primes exist.
pub fn ntt_primes(bit_size: u32, count: usize, n: usize) -> Option<Vec<u64>> {
    if !(2..=62).contains(&bit_size) || !n.is_power_of_two() {
        return None;
    }
    let step = 2 * n as u64;
    let upper = 1u64 << bit_size;
    let lower = 1u64 << (bit_size - 1);
    if step >= lower {
        return None;
    }

    let mut primes = Vec::with_capacity(count);
    // `upper` is a multiple of `step`, so `upper + 1` is the first candidate
    // above the range.
    let mut candidate = upper + 1 - step;
    while primes.len() < count && candidate > lower {
        if is_prime(candidate) {
            primes.push(candidate);
        }
        candidate -= step;
    }

    (primes.len() == count).then_some(primes)
}
