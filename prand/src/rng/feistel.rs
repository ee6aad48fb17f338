//! Balanced Feistel network over a 64-bit block
//!
//! The block is split into two 32-bit halves. Each round mixes the right
//! half through [`round`] with the round key and XORs it into the left half,
//! then swaps. The swap is applied after every round, the last one included.

use super::keys::KeySchedule;

/// Round function: `key + x + rotl(x, x & 31)`, wrapping mod 2^32
///
/// The rotate amount comes from the input itself, so the function is
/// data-dependent. Output must stay bit-exact; any change alters every
/// generated value.
///
/// # Example
/// ```
/// use feistel_prand::rng::round;
///
/// assert_eq!(round(0xFFFF_FFFF, 1), 0xFFFF_FFFF);
/// ```
#[inline]
pub fn round(x: u32, key: u32) -> u32 {
    key.wrapping_add(x).wrapping_add(x.rotate_left(x & 31))
}

/// Run one block through all rounds of the network
#[inline]
pub fn encrypt(block: u64, keys: &KeySchedule) -> u64 {
    let mut right = block as u32;
    let mut left = (block >> 32) as u32;
    for &key in keys {
        let temp = right;
        right = left ^ round(right, key);
        left = temp;
    }
    ((left as u64) << 32) | right as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::keys::{derive_keys, NUM_ROUNDS};

    #[test]
    fn test_round_wraps_at_32_bits() {
        // 1 + 0xFFFFFFFF + rotl(0xFFFFFFFF, 31) overflows twice
        assert_eq!(round(0xFFFF_FFFF, 1), 0xFFFF_FFFF);
    }

    #[test]
    fn test_round_zero_rotation() {
        assert_eq!(round(0, 0), 0);
        // x & 31 == 0, so the rotation is the identity
        assert_eq!(round(0x20, 5), 5 + 0x20 + 0x20);
    }

    #[test]
    fn test_round_rotates_left() {
        // x & 31 == 1: rotl(0x80000001, 1) == 0x00000003
        assert_eq!(round(0x8000_0001, 7), 0x8000_000B);
    }

    #[test]
    fn test_encrypt_zero_keys_zero_block() {
        // All-zero keys and block stay zero: round(0, 0) == 0
        assert_eq!(encrypt(0, &[0; NUM_ROUNDS]), 0);
    }

    #[test]
    fn test_encrypt_first_block_seed_one() {
        let keys = derive_keys(1);
        assert_eq!(encrypt(0, &keys), 0x0364_c20c_5a83_dadb);
        assert_eq!(encrypt(u64::MAX, &keys), 0xd115_f3dd_3eb3_3040);
    }
}
