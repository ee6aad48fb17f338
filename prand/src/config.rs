//! Stream configuration

use serde::{Deserialize, Serialize};

/// Seed used by implicit streams that were never explicitly seeded
pub const DEFAULT_SEED: u64 = 1;

/// Configuration applied to every implicit stream of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Seed for a context's first draw when it was never seeded
    #[serde(default = "default_seed")]
    pub default_seed: u64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            default_seed: DEFAULT_SEED,
        }
    }
}
