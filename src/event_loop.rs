//! Cooperative event loop
//!
//! Everything that touches transfer state runs on the calling thread. A
//! background reader turns raw terminal input into [`TerminalEvent`]s and hands
//! them over a channel; handlers queue output on a [`WriteQueue`] which the loop
//! flushes to the terminal between callbacks.

mod demux;
mod queue;
pub mod signals;
mod tty;

pub use demux::Demultiplexer;
pub use queue::WriteQueue;
pub use signals::DeathSignal;
pub use tty::{RawModeGuard, Tty};

use crossterm::event::KeyEvent;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::error::ClipError;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Envelope an escape payload arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    /// Operating system command, `ESC ]`
    Osc,
    /// Device control string, `ESC P`
    Dcs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalEvent {
    Escape(EscapeKind, Vec<u8>),
    Key(KeyEvent),
}

/// What a handler wants the loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Call `on_input` again once pending terminal events are handled
    Rearm,
    /// Call `on_input` again after the next poll interval, for sources with
    /// nothing to read yet
    Defer,
    Quit,
}

pub trait EventHandler {
    fn on_initialize(&mut self, out: &mut WriteQueue) -> Step;
    fn on_input(&mut self, out: &mut WriteQueue) -> Step;
    fn on_escape_payload(&mut self, kind: EscapeKind, payload: &[u8], out: &mut WriteQueue)
    -> Step;
    fn on_key_event(&mut self, key: KeyEvent, out: &mut WriteQueue) -> Step;
    fn on_signal(&mut self, signal: DeathSignal) -> Step;
    /// Failures of the loop itself, such as losing the terminal
    fn on_error(&mut self, error: ClipError) -> Step;
}

pub struct EventLoop<W: Write> {
    output: W,
    events: Receiver<TerminalEvent>,
    queue: WriteQueue,
    wakeup_pending: bool,
    wakeup_deferred: bool,
    signal_probe: fn() -> Option<DeathSignal>,
}

impl<W: Write> EventLoop<W> {
    pub fn new(output: W, events: Receiver<TerminalEvent>) -> Self {
        EventLoop {
            output,
            events,
            queue: WriteQueue::new(),
            wakeup_pending: false,
            wakeup_deferred: false,
            signal_probe: signals::take_pending,
        }
    }

    /// Replace the source of delivered signals
    pub fn with_signal_probe(mut self, probe: fn() -> Option<DeathSignal>) -> Self {
        self.signal_probe = probe;
        self
    }

    /// Drive `handler` until it quits. Returns the signal that ended the run,
    /// if any, so the caller can re-raise it after cleanup.
    pub fn run<H: EventHandler>(&mut self, handler: &mut H) -> Option<DeathSignal> {
        let step = handler.on_initialize(&mut self.queue);
        if self.apply(step, handler) {
            return None;
        }

        loop {
            if let Some(signal) = (self.signal_probe)() {
                #[cfg(debug_assertions)]
                log::debug!("Stopping on signal {}", signal.name());

                handler.on_signal(signal);
                let _ = self.flush();
                return Some(signal);
            }

            let mut disconnected = false;
            loop {
                match self.events.try_recv() {
                    Ok(event) => {
                        let step = self.dispatch(event, handler);
                        if self.apply(step, handler) {
                            return None;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }

            if self.wakeup_pending {
                self.wakeup_pending = false;
                let step = handler.on_input(&mut self.queue);
                if self.apply(step, handler) {
                    return None;
                }
                continue;
            }

            if disconnected {
                let error = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal input closed before the transfer finished",
                );
                handler.on_error(ClipError::Terminal(error));
                let _ = self.flush();
                return None;
            }

            // A deferred wakeup waits out this poll, so it cannot spin
            let deferred = std::mem::take(&mut self.wakeup_deferred);
            match self.events.recv_timeout(EVENT_POLL_TIMEOUT) {
                Ok(event) => {
                    let step = self.dispatch(event, handler);
                    if self.apply(step, handler) {
                        return None;
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
            }
            if deferred {
                self.wakeup_pending = true;
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn dispatch<H: EventHandler>(&mut self, event: TerminalEvent, handler: &mut H) -> Step {
        match event {
            TerminalEvent::Escape(kind, payload) => {
                handler.on_escape_payload(kind, &payload, &mut self.queue)
            }
            TerminalEvent::Key(key) => handler.on_key_event(key, &mut self.queue),
        }
    }

    /// Flush queued output and act on `step`. Returns true when the loop is done.
    fn apply<H: EventHandler>(&mut self, step: Step, handler: &mut H) -> bool {
        if let Err(e) = self.flush() {
            handler.on_error(ClipError::Terminal(e));
            return true;
        }
        match step {
            Step::Continue => false,
            Step::Rearm => {
                self.wakeup_pending = true;
                false
            }
            Step::Defer => {
                self.wakeup_deferred = true;
                false
            }
            Step::Quit => true,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let data = self.queue.take();
        self.output.write_all(&data)?;
        self.output.flush()
    }
}

#[cfg(test)]
#[path = "event_loop_tests.rs"]
mod event_loop_tests;
