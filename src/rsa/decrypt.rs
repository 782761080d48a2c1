// RSA Decryption Implementation
// Raises every cipher unit to d mod n and drops padding filler

use num_traits::One;
use tracing::trace;

use super::bigint::{mod_pow, RsaBigInt};
use super::codec::{decode_units, KeyToken};
use super::keygen::{check_modulus, RsaPrivateKey};
use super::padding::strip_filler;
use crate::error::{Result, RsaError};

/// Decrypt ciphertext bytes with a private key token
/// Returns the payload bytes with filler removed
pub fn decrypt_bytes(ciphertext: &[u8], private_key: &KeyToken) -> Result<Vec<u8>> {
    if ciphertext.is_empty() {
        return Err(RsaError::Validation("no data to decode"));
    }
    if private_key.as_biguint() <= &RsaBigInt::one() {
        return Err(RsaError::Validation("invalid key value"));
    }

    let key = RsaPrivateKey::from_token(private_key)?;
    decrypt_with_key(ciphertext, &key)
}

/// Decrypt ciphertext to a string
pub fn decrypt_to_string(ciphertext: &[u8], private_key: &KeyToken) -> Result<String> {
    let plaintext = decrypt_bytes(ciphertext, private_key)?;
    Ok(String::from_utf8(plaintext)?)
}

pub(crate) fn decrypt_with_key(ciphertext: &[u8], key: &RsaPrivateKey) -> Result<Vec<u8>> {
    if ciphertext.is_empty() {
        return Err(RsaError::Validation("no data to decode"));
    }
    check_modulus(&key.n)?;

    let units = decode_units(ciphertext)?;

    // m = c^d mod n, truncated to its low byte
    let bytes: Vec<u8> = units
        .iter()
        .map(|unit| low_byte(&mod_pow(unit, &key.d, &key.n)))
        .collect();

    let payload = strip_filler(&bytes);
    trace!(
        units = units.len(),
        payload_len = payload.len(),
        "decrypted payload"
    );
    Ok(payload)
}

fn low_byte(value: &RsaBigInt) -> u8 {
    value.to_bytes_le().first().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::codec::{encode_key, encode_units};
    use crate::rsa::encrypt::encrypt_string;
    use crate::rsa::keygen::RsaPublicKey;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    // n = 61 * 53, phi = lcm(60, 52) = 780, e = 7, d = 223
    fn test_tokens() -> (KeyToken, KeyToken) {
        let n = from_u64(3_233);
        (
            encode_key(&n, &from_u64(7)).unwrap(),
            encode_key(&n, &from_u64(223)).unwrap(),
        )
    }

    #[test]
    fn test_decrypt_to_string() {
        let (public, private) = test_tokens();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let message = "Test message for RSA decryption";

        let ciphertext = encrypt_string(message, &public, &mut rng).unwrap();
        let decrypted = decrypt_to_string(&ciphertext, &private).unwrap();

        assert_eq!(message, decrypted);
    }

    #[test]
    fn test_decrypt_multibyte_utf8() {
        let (public, private) = test_tokens();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let message = "héllo wörld ✓";

        let ciphertext = encrypt_string(message, &public, &mut rng).unwrap();
        assert_eq!(decrypt_to_string(&ciphertext, &private).unwrap(), message);
    }

    #[test]
    fn test_decrypt_empty() {
        let (_, private) = test_tokens();
        assert_eq!(
            decrypt_bytes(&[], &private),
            Err(RsaError::Validation("no data to decode"))
        );
    }

    #[test]
    fn test_decrypt_invalid_key() {
        assert_eq!(
            decrypt_bytes(&[1, 5], &KeyToken::from(1u64)),
            Err(RsaError::Validation("invalid key value"))
        );
    }

    #[test]
    fn test_decrypt_small_modulus() {
        // [1, 0, 5]: n = 0, d = 5
        let zero = KeyToken::from(from_u64(0x01_00_05));
        assert_eq!(
            decrypt_to_string(&[1, 7], &zero),
            Err(RsaError::Validation("invalid key value"))
        );

        let one = encode_key(&from_u64(1), &from_u64(5)).unwrap();
        assert_eq!(
            decrypt_bytes(&[1, 7], &one),
            Err(RsaError::Validation("invalid key value"))
        );
    }

    #[test]
    fn test_decrypt_truncated_ciphertext() {
        let (_, private) = test_tokens();
        assert!(matches!(
            decrypt_bytes(&[2, 0x01], &private),
            Err(RsaError::Serialization(_))
        ));
    }

    #[test]
    fn test_decrypt_invalid_utf8() {
        let (public, private) = test_tokens();
        let public = RsaPublicKey::from_token(&public).unwrap();
        // 0xff alone is never valid UTF-8
        let unit = from_u64(0xff).modpow(&public.e, &public.n);
        let ciphertext = encode_units(&[unit]).unwrap();

        assert!(matches!(
            decrypt_to_string(&ciphertext, &private),
            Err(RsaError::Decoding(_))
        ));
    }

    #[test]
    fn test_low_byte() {
        assert_eq!(low_byte(&from_u64(0)), 0);
        assert_eq!(low_byte(&from_u64(0x1234)), 0x34);
    }
}
