// RSA Big Integer Operations
// Number theory helpers over num-bigint used by key generation

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{Result, RsaError};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Convert big integer to bytes (big-endian)
pub fn to_bytes(n: &RsaBigInt) -> Vec<u8> {
    n.to_bytes_be()
}

/// Number of decimal digits in `n`
pub fn decimal_digits(n: &RsaBigInt) -> usize {
    n.to_str_radix(10).len()
}

/// Modular exponentiation: base^exp mod modulus
/// Uses square-and-multiply algorithm
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    let mut result = RsaBigInt::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    result
}

/// Greatest common divisor, gcd(a, 0) = a
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Least common multiple
///
/// Fails when both operands are zero, since the gcd would be zero.
pub fn lcm(a: &RsaBigInt, b: &RsaBigInt) -> Result<RsaBigInt> {
    let divisor = gcd(a, b);
    if divisor.is_zero() {
        return Err(RsaError::Arithmetic("lcm of zero and zero is undefined"));
    }
    Ok((a * b) / divisor)
}

/// Smallest integer e >= 2 that is coprime with `phi`
pub fn find_public_exponent(phi: &RsaBigInt) -> Result<RsaBigInt> {
    if phi.is_zero() {
        return Err(RsaError::Arithmetic("no exponent is coprime with zero"));
    }

    // Terminates: some prime above phi is always coprime with it.
    let mut e = from_u64(2);
    while !gcd(&e, phi).is_one() {
        e += 1u8;
    }
    Ok(e)
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x) such that a*x ≡ gcd (mod b)
fn extended_gcd(a: &RsaBigInt, b: &RsaBigInt) -> (BigInt, BigInt) {
    let mut old_r = BigInt::from_biguint(Sign::Plus, a.clone());
    let mut r = BigInt::from_biguint(Sign::Plus, b.clone());
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    (old_r, old_s)
}

/// Compute the smallest positive x < phi with e*x ≡ 1 (mod phi)
/// Returns None if phi <= 1 or the inverse doesn't exist
pub fn checked_mod_inverse(phi: &RsaBigInt, e: &RsaBigInt) -> Option<RsaBigInt> {
    if phi <= &RsaBigInt::one() {
        return None;
    }

    let (divisor, x) = extended_gcd(e, phi);
    if !divisor.is_one() {
        return None;
    }

    let phi = BigInt::from_biguint(Sign::Plus, phi.clone());
    x.mod_floor(&phi).to_biguint()
}

/// Compute modular inverse of e modulo phi
///
/// Returns the sentinel `1` when no inverse exists. Callers must treat that
/// value as a failed key generation unless `e ≡ 1 (mod phi)` really holds.
pub fn mod_inverse(phi: &RsaBigInt, e: &RsaBigInt) -> RsaBigInt {
    checked_mod_inverse(phi, e).unwrap_or_else(RsaBigInt::one)
}

/// Integer square root: largest r with r*r <= v
/// Newton's iteration seeded at 2^(bits/2)
pub fn integer_sqrt(v: &RsaBigInt) -> RsaBigInt {
    if v.is_zero() {
        return RsaBigInt::zero();
    }

    let mut root = RsaBigInt::one() << (v.bits() / 2);
    while !is_square_root(v, &root) {
        root = (&root + v / &root) >> 1;
    }
    root
}

fn is_square_root(v: &RsaBigInt, root: &RsaBigInt) -> bool {
    let next = root + 1u8;
    &(root * root) <= v && v < &(&next * &next)
}
