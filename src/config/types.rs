// Configuration type definitions

use serde::Deserialize;

/// Read size used for piped input when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Transfer defaults section
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    #[serde(default)]
    pub use_primary: bool,
    #[serde(default)]
    pub wait_for_completion: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            use_primary: false,
            wait_for_completion: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub transfer: TransferConfig,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;
