//! Incremental base64 encoder
//!
//! Encodes input as it arrives so payloads of unknown length never have to be
//! held in memory. Only whole 3-byte groups are encoded on `write`; up to two
//! trailing bytes wait for the next chunk or for `close`.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::ClipError;

#[derive(Debug, Default)]
pub struct StreamingEncoder {
    carry: [u8; 2],
    carry_len: usize,
    closed: bool,
}

impl StreamingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `chunk`, returning whatever output is complete so far.
    /// The result may be empty when fewer than three bytes are buffered.
    pub fn write(&mut self, chunk: &[u8]) -> Result<String, ClipError> {
        if self.closed {
            return Err(ClipError::EncoderClosed);
        }

        let mut input = chunk;
        let mut out = String::with_capacity((self.carry_len + chunk.len()) / 3 * 4);

        // Complete the carried partial group first
        if self.carry_len > 0 {
            let needed = 3 - self.carry_len;
            if input.len() < needed {
                self.carry[self.carry_len..self.carry_len + input.len()].copy_from_slice(input);
                self.carry_len += input.len();
                return Ok(out);
            }
            let mut group = [0u8; 3];
            group[..self.carry_len].copy_from_slice(&self.carry[..self.carry_len]);
            group[self.carry_len..].copy_from_slice(&input[..needed]);
            STANDARD.encode_string(group, &mut out);
            self.carry_len = 0;
            input = &input[needed..];
        }

        let whole = input.len() - input.len() % 3;
        STANDARD.encode_string(&input[..whole], &mut out);

        let rest = &input[whole..];
        self.carry[..rest.len()].copy_from_slice(rest);
        self.carry_len = rest.len();

        Ok(out)
    }

    /// Flush the trailing partial group with padding. The encoder refuses
    /// further input afterwards.
    pub fn close(&mut self) -> Result<String, ClipError> {
        if self.closed {
            return Err(ClipError::EncoderClosed);
        }
        self.closed = true;
        let tail = STANDARD.encode(&self.carry[..self.carry_len]);
        self.carry_len = 0;
        Ok(tail)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
