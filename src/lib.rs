//! Toy RSA cryptosystem with single-integer key tokens.
//!
//! Keys are built from two random primes and each half of the pair is packed
//! into one [`KeyToken`]. Text is encrypted one byte at a time: the UTF-8
//! bytes are padded to an 8-byte boundary with filler below `0x20`, every
//! byte is raised to `e mod n`, and the results are written back to back as
//! length-prefixed integers.
//!
//! This is not a production primitive. There is no constant-time arithmetic
//! and no standard padding scheme.
//!
//! ```
//! use rsa_tokens::{CryptoEngine, KeyGenConfig, Primality};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let config = KeyGenConfig::default()
//!     .with_prime_bytes(3)
//!     .with_primality(Primality::TrialDivision);
//! let mut engine = CryptoEngine::with_config(ChaCha20Rng::seed_from_u64(7), config);
//!
//! let keys = engine.generate_keys().unwrap();
//! let ciphertext = engine.encrypt("Hello, RSA!", &keys.public_key).unwrap();
//! assert_eq!(engine.decrypt(&ciphertext, &keys.private_key).unwrap(), "Hello, RSA!");
//! ```

pub mod error;
pub mod rsa;

pub use error::{Result, RsaError};
pub use rsa::{
    decrypt_bytes, decrypt_to_string, encrypt_bytes, encrypt_string, generate_keypair,
    CryptoEngine, KeyGenConfig, KeyToken, Primality, RsaKeyPair, RsaPrivateKey, RsaPublicKey,
};
