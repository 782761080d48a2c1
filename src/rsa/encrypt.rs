// RSA Encryption Implementation
// Pads the plaintext and raises every byte to e mod n

use num_traits::One;
use rand::Rng;
use tracing::trace;

use super::bigint::{from_u64, mod_pow, RsaBigInt};
use super::codec::{encode_units, KeyToken};
use super::keygen::{check_modulus, RsaPublicKey};
use super::padding::pad;
use crate::error::{Result, RsaError};

/// Encrypt bytes with a public key token
/// Returns the length-prefixed cipher units
pub fn encrypt_bytes<R: Rng + ?Sized>(
    plaintext: &[u8],
    public_key: &KeyToken,
    rng: &mut R,
) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(RsaError::Validation("no data to encode"));
    }
    if public_key.as_biguint() <= &RsaBigInt::one() {
        return Err(RsaError::Validation("invalid key value"));
    }

    let key = RsaPublicKey::from_token(public_key)?;
    encrypt_with_key(plaintext, &key, rng)
}

/// Encrypt a string with a public key token
pub fn encrypt_string<R: Rng + ?Sized>(
    plaintext: &str,
    public_key: &KeyToken,
    rng: &mut R,
) -> Result<Vec<u8>> {
    encrypt_bytes(plaintext.as_bytes(), public_key, rng)
}

pub(crate) fn encrypt_with_key<R: Rng + ?Sized>(
    plaintext: &[u8],
    key: &RsaPublicKey,
    rng: &mut R,
) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(RsaError::Validation("no data to encode"));
    }
    check_modulus(&key.n)?;

    let padded = pad(plaintext, rng);

    // c = m^e mod n for each byte
    let units: Vec<RsaBigInt> = padded
        .iter()
        .map(|&byte| mod_pow(&from_u64(u64::from(byte)), &key.e, &key.n))
        .collect();

    trace!(
        plaintext_len = plaintext.len(),
        units = units.len(),
        "encrypted payload"
    );
    encode_units(&units)
}
