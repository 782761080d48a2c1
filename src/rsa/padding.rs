// Block Padding
// Pads plaintext to an 8-byte boundary with filler below printable ASCII

use rand::Rng;

/// Padded length is always a multiple of this
pub const BLOCK_SIZE: usize = 8;

/// Filler bytes are masked into [0x00, 0x1f]
pub const FILLER_MASK: u8 = 0x1f;

/// Lowest byte value treated as payload when stripping
pub const PRINTABLE_FLOOR: u8 = 0x20;

/// Pad `data` to a multiple of BLOCK_SIZE
/// Filler bytes are random and always < PRINTABLE_FLOOR
pub fn pad<R: Rng + ?Sized>(data: &[u8], rng: &mut R) -> Vec<u8> {
    let remainder = data.len() % BLOCK_SIZE;
    let mut padded = data.to_vec();
    if remainder == 0 {
        return padded;
    }

    let mut filler = [0u8; BLOCK_SIZE];
    let filler = &mut filler[..BLOCK_SIZE - remainder];
    rng.fill_bytes(filler);
    padded.extend(filler.iter().map(|b| b & FILLER_MASK));
    padded
}

/// Drop every byte below PRINTABLE_FLOOR
pub fn strip_filler(data: &[u8]) -> Vec<u8> {
    data.iter().copied().filter(|&b| b >= PRINTABLE_FLOOR).collect()
}
