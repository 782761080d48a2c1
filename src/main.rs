//! rsa-tokens command line tool.
//!
//! # Usage
//!
//! ```bash
//! rsa-tokens keygen
//! rsa-tokens keygen --prime-bytes 3 --primality trial --seed 7
//! rsa-tokens encrypt --key <PUBLIC> "Hello, RSA!"
//! rsa-tokens decrypt --key <PRIVATE> <HEX>
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa_tokens::{decrypt_to_string, CryptoEngine, KeyGenConfig, KeyToken, Primality};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Toy RSA key generation and byte-wise encryption
#[derive(Parser, Debug)]
#[command(name = "rsa-tokens")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Seed for a reproducible run instead of OS entropy
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair and print both tokens
    Keygen {
        /// Random bytes per prime candidate
        #[arg(long, default_value_t = 16)]
        prime_bytes: usize,

        /// Primality test used while searching for primes
        #[arg(long, value_enum, default_value_t = PrimalityArg::MillerRabin)]
        primality: PrimalityArg,

        /// Worker threads for parallel trial division
        #[arg(long, default_value_t = 4)]
        workers: usize,

        /// Miller-Rabin rounds
        #[arg(long, default_value_t = 20)]
        rounds: u32,
    },
    /// Encrypt text with a public token, printing hex
    Encrypt {
        /// Public key token (decimal)
        #[arg(short, long)]
        key: KeyToken,

        /// Text to encrypt
        plaintext: String,
    },
    /// Decrypt hex ciphertext with a private token
    Decrypt {
        /// Private key token (decimal)
        #[arg(short, long)]
        key: KeyToken,

        /// Ciphertext as hex
        ciphertext: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PrimalityArg {
    Trial,
    Parallel,
    MillerRabin,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let rng = match args.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    match args.command {
        Command::Keygen {
            prime_bytes,
            primality,
            workers,
            rounds,
        } => {
            let primality = match primality {
                PrimalityArg::Trial => Primality::TrialDivision,
                PrimalityArg::Parallel => Primality::ParallelTrialDivision { workers },
                PrimalityArg::MillerRabin => Primality::MillerRabin { rounds },
            };
            let config = KeyGenConfig::default()
                .with_prime_bytes(prime_bytes)
                .with_primality(primality);

            tracing::info!(prime_bytes, ?primality, "generating key pair");
            let keys = CryptoEngine::with_config(rng, config)
                .generate_keys()
                .context("key generation failed")?;

            println!("public: {}", keys.public_key);
            println!("private: {}", keys.private_key);
        }
        Command::Encrypt { key, plaintext } => {
            let ciphertext = CryptoEngine::new(rng)
                .encrypt(&plaintext, &key)
                .context("encryption failed")?;
            println!("{}", hex::encode(ciphertext));
        }
        Command::Decrypt { key, ciphertext } => {
            let bytes = hex::decode(ciphertext.trim()).context("ciphertext is not valid hex")?;
            let plaintext = decrypt_to_string(&bytes, &key).context("decryption failed")?;
            println!("{}", plaintext);
        }
    }

    Ok(())
}
