//! Snapshot - Raw Generator State Layout
//!
//! Encodes a [`GeneratorState`] as its raw in-memory layout so a stream can
//! be saved and restored, or compared against another implementation of the
//! same generator.
//!
//! # Layout
//!
//! [`STATE_BYTES`] bytes, all little-endian:
//! - 24 × `u32` round keys, in round order
//! - 1 × `u64` counter
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored state continues the exact output sequence
//! - **Fingerprint**: [`digest`] is the SHA-256 of the layout, so equal
//!   digests mean equal states across implementations

use crate::rng::{GeneratorState, KeySchedule, NUM_ROUNDS};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Size of an encoded state in bytes
pub const STATE_BYTES: usize = NUM_ROUNDS * 4 + 8;

const COUNTER_OFFSET: usize = NUM_ROUNDS * 4;

/// Errors that can occur when restoring a snapshot
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("Invalid snapshot length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Snapshot digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a state into its raw layout
pub fn encode(state: &GeneratorState) -> [u8; STATE_BYTES] {
    let mut bytes = [0u8; STATE_BYTES];
    for (chunk, key) in bytes[..COUNTER_OFFSET]
        .chunks_exact_mut(4)
        .zip(state.keys())
    {
        chunk.copy_from_slice(&key.to_le_bytes());
    }
    bytes[COUNTER_OFFSET..].copy_from_slice(&state.counter().to_le_bytes());
    bytes
}

/// Decode a state from its raw layout
///
/// # Errors
/// [`SnapshotError::InvalidLength`] unless `bytes` is exactly
/// [`STATE_BYTES`] long.
pub fn decode(bytes: &[u8]) -> Result<GeneratorState, SnapshotError> {
    if bytes.len() != STATE_BYTES {
        return Err(SnapshotError::InvalidLength {
            expected: STATE_BYTES,
            actual: bytes.len(),
        });
    }

    let mut keys: KeySchedule = [0; NUM_ROUNDS];
    for (key, chunk) in keys.iter_mut().zip(bytes[..COUNTER_OFFSET].chunks_exact(4)) {
        *key = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let mut counter = [0u8; 8];
    counter.copy_from_slice(&bytes[COUNTER_OFFSET..]);

    Ok(GeneratorState::from_parts(keys, u64::from_le_bytes(counter)))
}

// ============================================================================
// Fingerprinting
// ============================================================================

/// SHA-256 hex digest of the raw layout of `state`
pub fn digest(state: &GeneratorState) -> String {
    digest_bytes(&encode(state))
}

fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Decode a snapshot and check it against a digest recorded at save time
///
/// The digest comparison is case-insensitive.
pub fn decode_verified(bytes: &[u8], expected: &str) -> Result<GeneratorState, SnapshotError> {
    let state = decode(bytes)?;
    let actual = digest_bytes(bytes);
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(SnapshotError::DigestMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(state)
}

impl GeneratorState {
    /// Raw layout of this state (see [`crate::snapshot`])
    pub fn to_bytes(&self) -> [u8; STATE_BYTES] {
        encode(self)
    }

    /// Restore a state from its raw layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode(bytes)
    }

    /// SHA-256 fingerprint of this state
    pub fn digest(&self) -> String {
        digest(self)
    }
}
