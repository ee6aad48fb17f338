//! Generator state and the reentrant API
//!
//! A [`GeneratorState`] owns one key schedule and one counter. Each call to
//! [`GeneratorState::next`] encrypts the counter with the key schedule and
//! then increments it, so output `n` of a stream is a pure function of the
//! seed and `n`.
//!
//! # Determinism
//!
//! Same seed → same sequence of outputs. The counter wraps at 2^64; the
//! output depends on the counter's bit pattern only, so wraparound is benign.
//!
//! # Concurrency
//!
//! A state carries no thread affinity and takes no locks. Sharing one
//! instance between concurrent callers needs external synchronization.

use rand_core::{impls, Error, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use super::feistel::encrypt;
use super::keys::{derive_keys, KeySchedule};

/// State of one Feistel generator stream
///
/// # Example
/// ```
/// use feistel_prand::GeneratorState;
///
/// let mut rng = GeneratorState::new(12345);
/// let value = rng.next();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratorState {
    /// Round keys, populated by seeding
    keys: KeySchedule,

    /// Feistel plaintext; incremented once per output
    counter: u64,
}

impl GeneratorState {
    /// Create a freshly seeded state
    ///
    /// # Arguments
    /// * `seed` - Seed value (any u64, zero included)
    pub fn new(seed: u64) -> Self {
        Self {
            keys: derive_keys(seed),
            counter: 0,
        }
    }

    /// Rebuild a state from raw parts
    ///
    /// The keys are trusted as given. A schedule not produced by seeding
    /// yields output of unspecified quality.
    pub fn from_parts(keys: KeySchedule, counter: u64) -> Self {
        Self { keys, counter }
    }

    /// Re-seed in place: new key schedule, counter reset to 0
    pub fn seed(&mut self, seed: u64) {
        self.keys = derive_keys(seed);
        self.counter = 0;
    }

    /// Generate the next 64-bit output and advance the counter
    ///
    /// # Example
    /// ```
    /// use feistel_prand::GeneratorState;
    ///
    /// let mut rng = GeneratorState::new(1);
    /// assert_eq!(rng.next(), 0x0364_c20c_5a83_dadb);
    /// assert_eq!(rng.counter(), 1);
    /// ```
    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn next(&mut self) -> u64 {
        let block = self.counter;
        self.counter = self.counter.wrapping_add(1);
        encrypt(block, &self.keys)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = max.wrapping_sub(min) as u64;
        min.wrapping_add((value % range_size) as i64)
    }

    /// Generate random f64 in range [0.0, 1.0) from the top 53 bits
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Round keys of this stream
    pub fn keys(&self) -> &KeySchedule {
        &self.keys
    }

    /// Number of outputs produced since seeding, modulo 2^64
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn into_parts(self) -> (KeySchedule, u64) {
        (self.keys, self.counter)
    }
}

impl RngCore for GeneratorState {
    /// Upper half of the next 64-bit output
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for GeneratorState {
    type Seed = [u8; 8];

    /// Seed word read little-endian
    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}
