//! Feistel PRNG - Deterministic Pseudorandom Streams
//!
//! A fast, reproducible generator built as a 24-round balanced Feistel
//! network over a 64-bit counter.
//!
//! # Architecture
//!
//! - **rng**: Key schedule, round function and the reentrant [`GeneratorState`]
//! - **context**: Implicit per-context streams and the process-wide convenience API
//! - **snapshot**: Raw state layout for save/restore and cross-validation
//! - **config**: Stream configuration (default seed)
//!
//! # Critical Invariants
//!
//! 1. Same seed → same output sequence
//! 2. All arithmetic wraps at its bit width
//! 3. Implicit streams are never used unseeded; they fall back to seed 1
//!
//! Not cryptographically secure.

// Module declarations
pub mod config;
pub mod context;
pub mod rng;
pub mod snapshot;

// Re-exports for convenience
pub use config::{StreamConfig, DEFAULT_SEED};
pub use context::{
    get_state, next_global, release_global, seed_global, set_state, ContextGuard, ContextId,
    ImplicitStream, StreamRegistry,
};
pub use rng::{GeneratorState, KeySchedule, NUM_ROUNDS};
pub use snapshot::{SnapshotError, STATE_BYTES};
