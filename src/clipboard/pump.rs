//! Input pump
//!
//! Pulls one bounded chunk from the payload source per call, runs it through
//! the streaming encoder and queues the result as part of the write frame.

use std::io::{ErrorKind, Read};

use super::encoder::StreamingEncoder;
use super::osc52::FrameEmitter;
use crate::error::ClipError;
use crate::event_loop::WriteQueue;

/// Where the payload comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A live terminal: nothing to send, so never read it
    Interactive,
    /// A pipe or redirected file
    Piped,
}

/// What a single pull achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// A chunk of this many bytes was encoded and queued
    Sent(usize),
    /// Nothing available right now; pull again later
    Pending,
    /// The source is exhausted and the write frame is closed
    EndOfStream,
}

pub struct InputPump<R> {
    source: R,
    kind: SourceKind,
    buf: Vec<u8>,
    encoder: StreamingEncoder,
    finished: bool,
}

impl<R: Read> InputPump<R> {
    pub fn new(source: R, kind: SourceKind, chunk_size: usize) -> Self {
        InputPump {
            source,
            kind,
            buf: vec![0; chunk_size.max(1)],
            encoder: StreamingEncoder::new(),
            finished: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pull(
        &mut self,
        frames: &mut FrameEmitter,
        out: &mut WriteQueue,
    ) -> Result<PumpStatus, ClipError> {
        if self.finished {
            return Ok(PumpStatus::EndOfStream);
        }

        if self.kind == SourceKind::Interactive {
            self.finished = true;
            return Ok(PumpStatus::EndOfStream);
        }

        match self.source.read(&mut self.buf) {
            Ok(0) => {
                let tail = self.encoder.close()?;
                frames.emit_chunk(out, &tail);
                frames.emit_close(out);
                self.finished = true;

                #[cfg(debug_assertions)]
                log::debug!("Input exhausted, write frame closed");

                Ok(PumpStatus::EndOfStream)
            }
            Ok(n) => {
                let encoded = self.encoder.write(&self.buf[..n])?;
                frames.emit_chunk(out, &encoded);
                Ok(PumpStatus::Sent(n))
            }
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                Ok(PumpStatus::Pending)
            }
            Err(e) => {
                self.finished = true;
                Err(ClipError::ReadInput(e))
            }
        }
    }
}
