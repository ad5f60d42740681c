//! Clipboard transfer over the terminal
//!
//! Moves a payload to or from the terminal's clipboard using OSC 52:
//! - streaming base64 encoding of piped input
//! - OSC 52 framing and the XTGETTCAP acknowledgment request
//! - classification of the terminal's replies
//! - the transfer state machine and its two-step cancel

mod encoder;
mod machine;
mod options;
pub mod osc52;
mod pump;
mod response;
mod sink;
mod state;

pub use encoder::StreamingEncoder;
pub use machine::TransferStateMachine;
pub use options::{Target, TransferOptions};
pub use osc52::FrameEmitter;
pub use pump::{InputPump, PumpStatus, SourceKind};
pub use response::{Reply, decode_reply};
pub use sink::{Outcome, ResultSink};
pub use state::{CancelOutcome, CancelStage, Phase, TransferState};
