//! OSC 52 framing
//!
//! Produces the escape sequences that move clipboard data through the
//! terminal's own byte stream. A write is one logical OSC message that may be
//! spread over any number of queued chunks:
//!
//! - `\x1b]52;` - OSC 52 introducer
//! - `c;` - selection (c = clipboard, p = primary)
//! - `{base64}` - payload, appended chunk by chunk
//! - `\x1b\` - string terminator (ST)

use super::options::Target;
use crate::event_loop::WriteQueue;

/// String terminator closing OSC and DCS messages
pub const ST: &str = "\x1b\\";

/// XTGETTCAP query for the `TN` capability. Terminals answer with a DCS reply
/// starting with `1+r`, which serves as an acknowledgment that everything sent
/// before it has been processed.
pub const ACK_REQUEST: &str = "\x1bP+q544e\x1b\\";

/// Build the opening of a write frame, without payload or terminator
pub fn write_open(target: Target) -> String {
    format!("\x1b]52;{};", target.as_str())
}

/// Build the self-contained request for the terminal to report a selection
pub fn read_request(target: Target) -> String {
    format!("\x1b]52;{};?{}", target.as_str(), ST)
}

/// Queues protocol frames for one transfer
#[derive(Debug)]
pub struct FrameEmitter {
    target: Target,
    write_open: bool,
    write_closed: bool,
}

impl FrameEmitter {
    pub fn new(target: Target) -> Self {
        FrameEmitter {
            target,
            write_open: false,
            write_closed: false,
        }
    }

    /// Queue an encoded chunk, opening the write frame first if needed
    pub fn emit_chunk(&mut self, out: &mut WriteQueue, encoded: &str) {
        if !self.write_open {
            out.queue_write_str(&write_open(self.target));
            self.write_open = true;
        }
        if !encoded.is_empty() {
            out.queue_write_str(encoded);
        }
    }

    /// Queue the terminator. Does nothing when no write frame was ever opened.
    pub fn emit_close(&mut self, out: &mut WriteQueue) {
        if !self.write_open || self.write_closed {
            return;
        }
        out.queue_write_str(ST);
        self.write_closed = true;
    }

    pub fn emit_read_request(&self, out: &mut WriteQueue) {
        out.queue_write_str(&read_request(self.target));
    }

    pub fn emit_ack_request(&self, out: &mut WriteQueue) {
        out.queue_write_str(ACK_REQUEST);
    }

    #[cfg(test)]
    pub(crate) fn is_write_open(&self) -> bool {
        self.write_open && !self.write_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use proptest::prelude::*;

    // Any payload framed in pieces decodes back to the original bytes
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_framed_payload_roundtrip(text in ".*") {
            let encoded = STANDARD.encode(&text);
            let (first, second) = encoded.split_at(encoded.len() / 2);

            let mut emitter = FrameEmitter::new(Target::Clipboard);
            let mut out = WriteQueue::new();
            emitter.emit_chunk(&mut out, first);
            emitter.emit_chunk(&mut out, second);
            emitter.emit_close(&mut out);

            let framed = String::from_utf8(out.take()).unwrap();
            prop_assert!(framed.starts_with("\x1b]52;c;"));
            prop_assert!(framed.ends_with("\x1b\\"));

            let body = &framed["\x1b]52;c;".len()..framed.len() - ST.len()];
            let decoded = STANDARD.decode(body).unwrap();
            prop_assert_eq!(String::from_utf8(decoded).unwrap(), text);
        }
    }

    #[test]
    fn test_write_frame_simple() {
        let mut emitter = FrameEmitter::new(Target::Clipboard);
        let mut out = WriteQueue::new();
        emitter.emit_chunk(&mut out, "aGVs");
        emitter.emit_chunk(&mut out, "bG8=");
        emitter.emit_close(&mut out);
        assert_eq!(out.as_bytes(), b"\x1b]52;c;aGVsbG8=\x1b\\");
    }

    #[test]
    fn test_primary_target() {
        let mut emitter = FrameEmitter::new(Target::Primary);
        let mut out = WriteQueue::new();
        emitter.emit_chunk(&mut out, "");
        emitter.emit_close(&mut out);
        assert_eq!(out.as_bytes(), b"\x1b]52;p;\x1b\\");
    }

    #[test]
    fn test_close_without_open_is_silent() {
        let mut emitter = FrameEmitter::new(Target::Clipboard);
        let mut out = WriteQueue::new();
        emitter.emit_close(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_close_is_emitted_once() {
        let mut emitter = FrameEmitter::new(Target::Clipboard);
        let mut out = WriteQueue::new();
        emitter.emit_chunk(&mut out, "YQ==");
        assert!(emitter.is_write_open());
        emitter.emit_close(&mut out);
        emitter.emit_close(&mut out);
        assert!(!emitter.is_write_open());
        assert_eq!(out.as_bytes(), b"\x1b]52;c;YQ==\x1b\\");
    }

    #[test]
    fn test_read_request_literal() {
        assert_eq!(read_request(Target::Clipboard), "\x1b]52;c;?\x1b\\");
        assert_eq!(read_request(Target::Primary), "\x1b]52;p;?\x1b\\");
    }

    #[test]
    fn test_ack_request_literal() {
        let emitter = FrameEmitter::new(Target::Clipboard);
        let mut out = WriteQueue::new();
        emitter.emit_ack_request(&mut out);
        assert_eq!(out.as_bytes(), b"\x1bP+q544e\x1b\\");
    }
}
