use crate::config::{Config, DEFAULT_CHUNK_SIZE};

/// Which selection buffer the terminal should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Clipboard,
    Primary,
}

impl Target {
    /// The single-letter selection parameter of OSC 52
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Clipboard => "c",
            Target::Primary => "p",
        }
    }
}

/// Per-invocation transfer settings. Never changes once a transfer starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    pub use_primary: bool,
    pub request_from_terminal: bool,
    pub wait_for_ack: bool,
    pub chunk_size: usize,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions {
            use_primary: false,
            request_from_terminal: false,
            wait_for_ack: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TransferOptions {
    /// Start from configured defaults; command line flags are applied on top
    pub fn from_config(config: &Config) -> Self {
        TransferOptions {
            use_primary: config.transfer.use_primary,
            request_from_terminal: false,
            wait_for_ack: config.transfer.wait_for_completion,
            chunk_size: config.transfer.chunk_size.max(1),
        }
    }

    pub fn target(&self) -> Target {
        if self.use_primary {
            Target::Primary
        } else {
            Target::Clipboard
        }
    }
}
