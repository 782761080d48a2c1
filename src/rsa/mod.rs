// RSA Module - Main module file
// Exports key generation, token codec and byte-wise encryption

pub mod bigint;
pub mod codec;
pub mod decrypt;
pub mod encrypt;
pub mod engine;
pub mod keygen;
pub mod padding;
pub mod prime;

pub use codec::{decode_key, encode_key, KeyToken};
pub use decrypt::{decrypt_bytes, decrypt_to_string};
pub use encrypt::{encrypt_bytes, encrypt_string};
pub use engine::CryptoEngine;
pub use keygen::{generate_keypair, KeyGenConfig, RsaKeyPair, RsaPrivateKey, RsaPublicKey};
pub use padding::pad;
pub use prime::{is_prime, is_prime_parallel, Primality, PrimeGenerator};
