//! Transfer state machine
//!
//! Streams the payload while in `Sending`, then asks the terminal for either
//! an acknowledgment or the clipboard contents and waits. Only the waits can
//! be cancelled: the first Ctrl+C or Esc prints a warning, the second aborts.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io::{self, Read};

use super::options::TransferOptions;
use super::osc52::FrameEmitter;
use super::pump::{InputPump, PumpStatus, SourceKind};
use super::response::{Reply, decode_reply};
use super::sink::Outcome;
use super::state::{CancelOutcome, Phase, TransferState};
use crate::error::ClipError;
use crate::event_loop::{DeathSignal, EscapeKind, EventHandler, Step, WriteQueue};

pub struct TransferStateMachine<R> {
    options: TransferOptions,
    pump: InputPump<R>,
    frames: FrameEmitter,
    state: TransferState,
}

impl<R: Read> TransferStateMachine<R> {
    pub fn new(options: TransferOptions, source: R, kind: SourceKind) -> Self {
        let pump = InputPump::new(source, kind, options.chunk_size);
        let frames = FrameEmitter::new(options.target());
        TransferStateMachine {
            options,
            pump,
            frames,
            state: TransferState::new(),
        }
    }

    pub fn state(&self) -> &TransferState {
        &self.state
    }

    pub fn into_outcome(self) -> Outcome {
        match self.state.into_parts() {
            (Phase::Completed, payload, _) => Outcome::Completed(payload),
            (Phase::Aborted, _, error) => Outcome::Aborted(error.unwrap_or(ClipError::AbortedByUser)),
            (Phase::Failed, _, Some(error)) => Outcome::Failed(error),
            (_, _, _) => Outcome::Failed(ClipError::Terminal(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "transfer ended before it finished",
            ))),
        }
    }

    fn current_step(&self) -> Step {
        if self.state.phase().is_terminal() {
            Step::Quit
        } else {
            Step::Continue
        }
    }

    fn finish_sending(&mut self, out: &mut WriteQueue) {
        if self.options.request_from_terminal {
            self.frames.emit_read_request(out);
            self.state.begin_wait(Phase::AwaitingData);
        } else if self.options.wait_for_ack {
            self.frames.emit_ack_request(out);
            self.state.begin_wait(Phase::AwaitingAck);
        } else {
            self.state.complete();
        }

        #[cfg(debug_assertions)]
        log::debug!("Sending finished, now {:?}", self.state.phase());
    }
}

/// Display name of a key that requests cancellation
fn cancel_key_name(key: &KeyEvent) -> Option<&'static str> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some("Ctrl+C"),
        KeyCode::Esc => Some("Esc"),
        _ => None,
    }
}

impl<R: Read> EventHandler for TransferStateMachine<R> {
    fn on_initialize(&mut self, out: &mut WriteQueue) -> Step {
        self.on_input(out)
    }

    fn on_input(&mut self, out: &mut WriteQueue) -> Step {
        if self.state.phase() != Phase::Sending {
            return self.current_step();
        }

        match self.pump.pull(&mut self.frames, out) {
            Ok(PumpStatus::Sent(_)) => Step::Rearm,
            Ok(PumpStatus::Pending) => Step::Defer,
            Ok(PumpStatus::EndOfStream) => {
                self.finish_sending(out);
                self.current_step()
            }
            Err(e) => {
                self.state.fail(e);
                Step::Quit
            }
        }
    }

    fn on_escape_payload(&mut self, kind: EscapeKind, payload: &[u8], _out: &mut WriteQueue) -> Step {
        let phase = self.state.phase();
        if !phase.is_waiting() {
            return self.current_step();
        }

        match (phase, decode_reply(kind, payload)) {
            (Phase::AwaitingAck, Ok(Reply::Ack)) => self.state.complete(),
            (Phase::AwaitingData, Ok(Reply::ClipboardData(data))) => {
                #[cfg(debug_assertions)]
                log::debug!("Received {} bytes from terminal", data.len());
                self.state.complete_with_payload(data);
            }
            (Phase::AwaitingData, Ok(Reply::Declined)) => self.state.complete(),
            (Phase::AwaitingData, Err(e)) => self.state.fail(e),
            _ => {}
        }
        self.current_step()
    }

    fn on_key_event(&mut self, key: KeyEvent, out: &mut WriteQueue) -> Step {
        let Some(key_name) = cancel_key_name(&key) else {
            return self.current_step();
        };

        match self.state.register_cancel() {
            CancelOutcome::Ignored => {}
            CancelOutcome::Warn => out.queue_write_str(&format!(
                "Waiting for response from terminal, press {} again to abort. \
                 This could cause garbage to be spewed to the screen.\r\n",
                key_name
            )),
            CancelOutcome::Abort => {
                #[cfg(debug_assertions)]
                log::debug!("Transfer aborted by user");
            }
        }
        self.current_step()
    }

    fn on_signal(&mut self, signal: DeathSignal) -> Step {
        self.state.fail(ClipError::TerminatedBySignal(signal.name()));
        Step::Quit
    }

    fn on_error(&mut self, error: ClipError) -> Step {
        self.state.fail(error);
        Step::Quit
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod machine_tests;
