//! termclip library - terminal clipboard transfer over OSC 52
//!
//! This library exposes the core functionality of termclip for testing purposes.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod event_loop;

// Re-export commonly used types for convenience
pub use clipboard::{Outcome, TransferOptions, TransferStateMachine};
pub use config::Config;
pub use error::ClipError;
