// Prime Generation
// Primality tests and the random prime source used by key generation

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use num_bigint::RandBigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;
use tracing::{trace, warn};

use super::bigint::{decimal_digits, from_bytes, from_u64, integer_sqrt, mod_pow, RsaBigInt};
use crate::error::{Result, RsaError};

/// Default number of random bytes drawn per prime candidate (about 128 bits)
pub const DEFAULT_PRIME_BYTES: usize = 16;

/// Default number of Q redraws before giving up on differing digit lengths
pub const DEFAULT_MAX_DIGIT_RETRIES: u32 = 10_000;

/// How candidates are confirmed prime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primality {
    /// Deterministic 6k±1 trial division on the calling thread
    TrialDivision,
    /// Trial division split across scoped worker threads
    ParallelTrialDivision { workers: usize },
    /// Miller-Rabin with witnesses drawn from the key generation RNG
    MillerRabin { rounds: u32 },
}

impl Default for Primality {
    fn default() -> Self {
        Primality::MillerRabin { rounds: 20 }
    }
}

/// Deterministic trial division primality test
pub fn is_prime(v: &RsaBigInt) -> bool {
    match small_cases(v) {
        Some(answer) => answer,
        None => {
            let limit = integer_sqrt(v);
            let mut i = from_u64(5);
            while i <= limit {
                if divides(&i, v) || divides(&(&i + 2u8), v) {
                    return false;
                }
                i += 6u8;
            }
            true
        }
    }
}

/// Trial division with the 6k±1 candidates split over `workers` threads.
///
/// Worker `w` scans `i = 5 + 6(w + m·workers)` for m = 0, 1, ... and exits as
/// soon as any worker has flagged a divisor.
pub fn is_prime_parallel(v: &RsaBigInt, workers: usize) -> bool {
    if let Some(answer) = small_cases(v) {
        return answer;
    }

    let workers = workers.max(1);
    let limit = integer_sqrt(v);
    let composite = AtomicBool::new(false);
    let stride = from_u64(6 * workers as u64);

    thread::scope(|scope| {
        for worker in 0..workers {
            let limit = &limit;
            let composite = &composite;
            let stride = &stride;
            scope.spawn(move || {
                let mut i = from_u64(5 + 6 * worker as u64);
                while &i <= limit {
                    if composite.load(Ordering::Relaxed) {
                        return;
                    }
                    if divides(&i, v) || divides(&(&i + 2u8), v) {
                        trace!(divisor = %i, "worker {} found a divisor", worker);
                        composite.store(true, Ordering::Relaxed);
                        return;
                    }
                    i += stride;
                }
            });
        }
    });

    !composite.load(Ordering::Relaxed)
}

/// Miller-Rabin primality test
/// Returns true if n is probably prime
pub fn is_probable_prime<R: Rng + ?Sized>(n: &RsaBigInt, rounds: u32, rng: &mut R) -> bool {
    if let Some(answer) = small_cases(n) {
        return answer;
    }
    if n == &from_u64(5) {
        return true;
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let two = from_u64(2);
    let n_minus_two = n - 2u8;

    'witness: for _ in 0..rounds {
        // Pick random witness a in [2, n-2)
        let a = rng.gen_biguint_range(&two, &n_minus_two);
        let mut x = mod_pow(&a, &d, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = mod_pow(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

fn small_cases(v: &RsaBigInt) -> Option<bool> {
    if v < &from_u64(2) {
        return Some(false);
    }
    if v <= &from_u64(3) {
        return Some(true);
    }
    if divides(&from_u64(2), v) || divides(&from_u64(3), v) {
        return Some(false);
    }
    None
}

fn divides(divisor: &RsaBigInt, v: &RsaBigInt) -> bool {
    (v % divisor).is_zero()
}

/// Random prime source with a fixed candidate width
#[derive(Debug, Clone)]
pub struct PrimeGenerator {
    prime_bytes: usize,
    primality: Primality,
    max_digit_retries: u32,
}

impl Default for PrimeGenerator {
    fn default() -> Self {
        Self {
            prime_bytes: DEFAULT_PRIME_BYTES,
            primality: Primality::default(),
            max_digit_retries: DEFAULT_MAX_DIGIT_RETRIES,
        }
    }
}

impl PrimeGenerator {
    pub fn new(prime_bytes: usize, primality: Primality, max_digit_retries: u32) -> Result<Self> {
        if prime_bytes == 0 {
            return Err(RsaError::InvalidConfig("prime_bytes must be at least 1".to_string()));
        }
        match primality {
            Primality::ParallelTrialDivision { workers: 0 } => {
                return Err(RsaError::InvalidConfig(
                    "parallel trial division needs at least one worker".to_string(),
                ));
            }
            Primality::MillerRabin { rounds: 0 } => {
                return Err(RsaError::InvalidConfig(
                    "Miller-Rabin needs at least one round".to_string(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            prime_bytes,
            primality,
            max_digit_retries,
        })
    }

    /// Check a candidate with the configured strategy
    pub fn check<R: Rng + ?Sized>(&self, candidate: &RsaBigInt, rng: &mut R) -> bool {
        match self.primality {
            Primality::TrialDivision => is_prime(candidate),
            Primality::ParallelTrialDivision { workers } => is_prime_parallel(candidate, workers),
            Primality::MillerRabin { rounds } => is_probable_prime(candidate, rounds, rng),
        }
    }

    /// Draw random bytes and walk up to the next prime
    /// Returns the prime and its decimal digit count
    pub fn next_prime<R: Rng + ?Sized>(&self, rng: &mut R) -> (RsaBigInt, usize) {
        let mut bytes = vec![0u8; self.prime_bytes];
        rng.fill_bytes(&mut bytes);

        let mut candidate = from_bytes(&bytes);
        if candidate < from_u64(2) {
            candidate = from_u64(2);
        }
        while !self.check(&candidate, rng) {
            candidate += 1u8;
        }

        let digits = decimal_digits(&candidate);
        trace!(digits, "found prime candidate");
        (candidate, digits)
    }

    /// Draw P and Q whose decimal lengths differ.
    ///
    /// After `max_digit_retries` draws of Q the last one is accepted unless it
    /// equals P, in which case Q is drawn again until they differ.
    pub fn distinct_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (RsaBigInt, RsaBigInt) {
        let (p, p_digits) = self.next_prime(rng);
        let (mut q, mut q_digits) = self.next_prime(rng);

        let mut attempts = 1;
        while q_digits == p_digits && attempts < self.max_digit_retries {
            (q, q_digits) = self.next_prime(rng);
            attempts += 1;
        }

        if q_digits == p_digits {
            warn!(
                attempts,
                digits = p_digits,
                "primes share a digit length, accepting last draw"
            );
        }

        // The retry budget only covers digit length; P and Q must never match
        while q == p {
            (q, _) = self.next_prime(rng);
        }

        (p, q)
    }
}
