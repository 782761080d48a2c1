// RSA Key Generation
// Builds the public and private key tokens from two random primes

use num_traits::One;
use rand::Rng;
use tracing::debug;

use super::bigint::{find_public_exponent, lcm, mod_inverse, RsaBigInt};
use super::codec::{decode_key, encode_key, KeyToken};
use super::prime::{Primality, PrimeGenerator, DEFAULT_MAX_DIGIT_RETRIES, DEFAULT_PRIME_BYTES};
use crate::error::{Result, RsaError};

/// Configuration for key generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenConfig {
    pub prime_bytes: usize,
    pub primality: Primality,
    pub max_digit_retries: u32,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            prime_bytes: DEFAULT_PRIME_BYTES,
            primality: Primality::default(),
            max_digit_retries: DEFAULT_MAX_DIGIT_RETRIES,
        }
    }
}

impl KeyGenConfig {
    pub fn with_prime_bytes(mut self, prime_bytes: usize) -> Self {
        self.prime_bytes = prime_bytes;
        self
    }

    pub fn with_primality(mut self, primality: Primality) -> Self {
        self.primality = primality;
        self
    }

    pub fn with_max_digit_retries(mut self, retries: u32) -> Self {
        self.max_digit_retries = retries;
        self
    }

    /// Check the settings and build the matching prime source
    pub fn prime_generator(&self) -> Result<PrimeGenerator> {
        PrimeGenerator::new(self.prime_bytes, self.primality, self.max_digit_retries)
    }
}

/// Reject moduli that cannot hold every byte value, zero included
pub(crate) fn check_modulus(n: &RsaBigInt) -> Result<()> {
    if n <= &RsaBigInt::from(u8::MAX) {
        return Err(RsaError::Validation("invalid key value"));
    }
    Ok(())
}

/// RSA Public Key, decoded from a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// RSA Private Key, decoded from a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt, // Modulus (same as public)
    pub d: RsaBigInt, // Private exponent
}

/// RSA Key Pair as the two caller-held tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    pub public_key: KeyToken,
    pub private_key: KeyToken,
}

impl RsaPublicKey {
    pub fn from_token(token: &KeyToken) -> Result<Self> {
        let (n, e) = decode_key(token)?;
        Ok(Self { n, e })
    }

    pub fn to_token(&self) -> Result<KeyToken> {
        encode_key(&self.n, &self.e)
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt a message using this public key
    pub fn encrypt<R: Rng + ?Sized>(&self, plaintext: &[u8], rng: &mut R) -> Result<Vec<u8>> {
        super::encrypt::encrypt_with_key(plaintext, self, rng)
    }
}

impl RsaPrivateKey {
    pub fn from_token(token: &KeyToken) -> Result<Self> {
        let (n, d) = decode_key(token)?;
        Ok(Self { n, d })
    }

    pub fn to_token(&self) -> Result<KeyToken> {
        encode_key(&self.n, &self.d)
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Decrypt a ciphertext using this private key
    /// Returns the payload bytes with filler removed
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        super::decrypt::decrypt_with_key(ciphertext, self)
    }
}

impl RsaKeyPair {
    pub fn public(&self) -> Result<RsaPublicKey> {
        RsaPublicKey::from_token(&self.public_key)
    }

    pub fn private(&self) -> Result<RsaPrivateKey> {
        RsaPrivateKey::from_token(&self.private_key)
    }
}

/// Generate an RSA key pair
///
/// P and Q come from `config`'s prime source, `phi = lcm(P-1, Q-1)`, `e` is
/// the smallest integer >= 2 coprime with phi and `d` its inverse mod phi.
pub fn generate_keypair<R: Rng + ?Sized>(config: &KeyGenConfig, rng: &mut R) -> Result<RsaKeyPair> {
    let generator = config.prime_generator()?;

    // Step 1: Two random primes of differing decimal length
    let (p, q) = generator.distinct_pair(rng);
    debug!(p_bits = p.bits(), q_bits = q.bits(), "drew prime pair");
    if p == q {
        return Err(RsaError::KeyGeneration("both primes are equal".to_string()));
    }

    // Step 2: Modulus
    let n = &p * &q;
    if n <= RsaBigInt::from(u8::MAX) {
        return Err(RsaError::KeyGeneration(format!(
            "modulus {} cannot carry a byte value",
            n
        )));
    }

    // Step 3: Totient
    let phi = lcm(&(&p - 1u8), &(&q - 1u8))?;

    // Step 4: Public and private exponents
    let e = find_public_exponent(&phi)?;
    let d = mod_inverse(&phi, &e);
    if !((&e * &d) % &phi).is_one() {
        return Err(RsaError::KeyGeneration(format!(
            "no inverse of e={} modulo the totient",
            e
        )));
    }
    debug!(modulus_bits = n.bits(), %e, "derived exponents");

    Ok(RsaKeyPair {
        public_key: encode_key(&n, &e)?,
        private_key: encode_key(&n, &d)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::{from_u64, gcd};
    use crate::rsa::prime::is_prime;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_config() -> KeyGenConfig {
        KeyGenConfig::default()
            .with_prime_bytes(3)
            .with_primality(Primality::TrialDivision)
    }

    #[test]
    fn test_key_generation() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let keypair = generate_keypair(&test_config(), &mut rng).unwrap();

        let public = keypair.public().unwrap();
        let private = keypair.private().unwrap();
        assert_eq!(public.n, private.n);
        assert!(public.n > from_u64(255));
        assert!(private.d > from_u64(0));
    }

    #[test]
    fn test_key_properties() {
        let config = test_config();
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let keypair = generate_keypair(&config, &mut rng).unwrap();

        // Replay the same draws to recover P and Q
        let mut replay = ChaCha20Rng::seed_from_u64(12);
        let (p, q) = config.prime_generator().unwrap().distinct_pair(&mut replay);
        assert!(is_prime(&p) && is_prime(&q));

        let public = keypair.public().unwrap();
        let private = keypair.private().unwrap();
        assert_eq!(public.n, &p * &q);

        // Verify e * d ≡ 1 (mod φ)
        let phi = lcm(&(&p - 1u8), &(&q - 1u8)).unwrap();
        assert_eq!((&public.e * &private.d) % &phi, from_u64(1));
        assert_eq!(gcd(&public.e, &phi), from_u64(1));
    }

    #[test]
    fn test_key_generation_is_deterministic() {
        let config = test_config();
        let a = generate_keypair(&config, &mut ChaCha20Rng::seed_from_u64(5)).unwrap();
        let b = generate_keypair(&config, &mut ChaCha20Rng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_generation_miller_rabin() {
        let config = KeyGenConfig::default().with_prime_bytes(8);
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let keypair = generate_keypair(&config, &mut rng).unwrap();
        assert!(keypair.public().unwrap().bit_length() > 64);
    }

    #[test]
    fn test_key_token_roundtrip() {
        let public = RsaPublicKey {
            n: from_u64(3_233),
            e: from_u64(17),
        };
        let token = public.to_token().unwrap();
        assert_eq!(RsaPublicKey::from_token(&token).unwrap(), public);
    }

    #[test]
    fn test_single_byte_primes_never_repeat() {
        // Tiny primes exhaust the digit retry budget on almost every draw
        let config = KeyGenConfig::default()
            .with_prime_bytes(1)
            .with_primality(Primality::TrialDivision)
            .with_max_digit_retries(1);

        for seed in 0..500 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let keypair = match generate_keypair(&config, &mut rng) {
                Ok(keypair) => keypair,
                Err(RsaError::KeyGeneration(_)) => continue,
                Err(e) => panic!("seed={seed}: {e}"),
            };

            let public = keypair.public().unwrap();
            let private = keypair.private().unwrap();
            let ciphertext = public.encrypt(b"Hello, RSA!", &mut rng).unwrap();
            assert_eq!(private.decrypt(&ciphertext).unwrap(), b"Hello, RSA!", "seed={seed}");
        }
    }

    #[test]
    fn test_key_methods_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(14);
        let keypair = generate_keypair(&test_config(), &mut rng).unwrap();
        let public = keypair.public().unwrap();
        let private = keypair.private().unwrap();

        assert_eq!(private.to_token().unwrap(), keypair.private_key);
        assert_eq!(public.to_token().unwrap(), keypair.public_key);

        let ciphertext = public.encrypt("key methods".as_bytes(), &mut rng).unwrap();
        assert_eq!(private.decrypt(&ciphertext).unwrap(), b"key methods");
    }

    #[test]
    fn test_key_methods_reject_bad_input() {
        let mut rng = ChaCha20Rng::seed_from_u64(15);
        let keypair = generate_keypair(&test_config(), &mut rng).unwrap();
        let public = keypair.public().unwrap();
        let private = keypair.private().unwrap();

        assert_eq!(
            public.encrypt(b"", &mut rng),
            Err(RsaError::Validation("no data to encode"))
        );
        assert_eq!(
            private.decrypt(&[]),
            Err(RsaError::Validation("no data to decode"))
        );

        let small = RsaPublicKey {
            n: from_u64(1),
            e: from_u64(5),
        };
        assert_eq!(
            small.encrypt(b"abc", &mut rng),
            Err(RsaError::Validation("invalid key value"))
        );
        let small = RsaPrivateKey {
            n: from_u64(0),
            d: from_u64(5),
        };
        assert_eq!(
            small.decrypt(&[1, 7]),
            Err(RsaError::Validation("invalid key value"))
        );
    }

    #[test]
    fn test_check_modulus() {
        assert!(check_modulus(&from_u64(0)).is_err());
        assert!(check_modulus(&from_u64(255)).is_err());
        assert!(check_modulus(&from_u64(256)).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let config = KeyGenConfig::default().with_prime_bytes(0);
        assert!(matches!(
            generate_keypair(&config, &mut rng),
            Err(RsaError::InvalidConfig(_))
        ));
    }
}
