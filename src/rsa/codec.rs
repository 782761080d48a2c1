//! Length-prefixed integer framing for key tokens and ciphertext.
//!
//! Every integer is written as `[L][L bytes, big-endian]`. A key token is the
//! modulus written that way followed by the raw exponent bytes, with the whole
//! buffer read back as one big-endian integer. Because `L >= 1`, the leading
//! byte is never zero and the token converts back to the same buffer.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigUint, ParseBigIntError};

use super::bigint::{from_bytes, to_bytes, RsaBigInt};
use crate::error::{Result, RsaError};

/// Largest integer width a single length byte can describe
pub const MAX_PREFIXED_LEN: usize = u8::MAX as usize;

/// A (modulus, exponent) pair packed into a single integer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyToken(BigUint);

impl KeyToken {
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for KeyToken {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for KeyToken {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for KeyToken {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Append `value` as `[L][L bytes]`
pub fn write_prefixed(out: &mut Vec<u8>, value: &RsaBigInt) -> Result<()> {
    let bytes = to_bytes(value);
    let len = u8::try_from(bytes.len()).map_err(|_| {
        RsaError::Serialization(format!(
            "integer needs {} bytes, length prefix holds at most {}",
            bytes.len(),
            MAX_PREFIXED_LEN
        ))
    })?;

    out.push(len);
    out.extend_from_slice(&bytes);
    Ok(())
}

/// Read one `[L][L bytes]` integer from the front of `buf`
/// Returns the value and the unread remainder
pub fn read_prefixed(buf: &[u8]) -> Result<(RsaBigInt, &[u8])> {
    let (&len, rest) = buf
        .split_first()
        .ok_or_else(|| RsaError::Serialization("missing length byte".to_string()))?;
    let len = usize::from(len);

    if len == 0 {
        return Err(RsaError::Serialization("zero-length integer".to_string()));
    }
    if rest.len() < len {
        return Err(RsaError::Serialization(format!(
            "length byte claims {} bytes, only {} present",
            len,
            rest.len()
        )));
    }

    let (value, rest) = rest.split_at(len);
    Ok((from_bytes(value), rest))
}

/// Pack (n, exponent) into a key token
pub fn encode_key(n: &RsaBigInt, exponent: &RsaBigInt) -> Result<KeyToken> {
    let mut buf = Vec::new();
    write_prefixed(&mut buf, n)?;
    buf.extend_from_slice(&to_bytes(exponent));
    Ok(KeyToken(from_bytes(&buf)))
}

/// Unpack a key token into (n, exponent)
pub fn decode_key(token: &KeyToken) -> Result<(RsaBigInt, RsaBigInt)> {
    let buf = to_bytes(&token.0);
    let (n, rest) = read_prefixed(&buf)?;

    if rest.is_empty() {
        return Err(RsaError::Serialization("token has no exponent bytes".to_string()));
    }

    Ok((n, from_bytes(rest)))
}

/// Concatenate cipher units, each length-prefixed
pub fn encode_units(units: &[RsaBigInt]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(units.len() * 8);
    for unit in units {
        write_prefixed(&mut out, unit)?;
    }
    Ok(out)
}

/// Split a ciphertext buffer back into its cipher units
pub fn decode_units(mut buf: &[u8]) -> Result<Vec<RsaBigInt>> {
    let mut units = Vec::new();
    while !buf.is_empty() {
        let (unit, rest) = read_prefixed(buf)?;
        units.push(unit);
        buf = rest;
    }
    Ok(units)
}
