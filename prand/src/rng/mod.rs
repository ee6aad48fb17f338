//! Deterministic random number generation
//!
//! Uses a 24-round balanced Feistel network keyed from the seed. Each output
//! is the encryption of an incrementing 64-bit counter.
//! Not a CSPRNG: do not use for keys, tokens or anything secret.

mod feistel;
mod keys;
mod state;

pub use feistel::{encrypt, round};
pub use keys::{derive_keys, KeySchedule, NUM_ROUNDS};
pub use state::GeneratorState;
