//! Raw terminal input to events
//!
//! Implements vte's `Perform` to pick whole OSC and DCS payloads out of the
//! terminal's byte stream, plus the two keys the transfer cares about. Printable
//! input and other sequences are dropped.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use vte::{Params, Parser, Perform};

use super::{EscapeKind, TerminalEvent};

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;
const CTRL_C: u8 = 0x03;

pub struct Demultiplexer {
    parser: Parser,
    collector: Collector,
    /// Inside an OSC or DCS string, where a bare ESC is part of the terminator
    in_string: bool,
    last_byte: u8,
}

impl Default for Demultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Demultiplexer {
    pub fn new() -> Self {
        Demultiplexer {
            parser: Parser::new(),
            collector: Collector::default(),
            in_string: false,
            last_byte: 0,
        }
    }

    /// Feed one read's worth of input and return the events it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<TerminalEvent> {
        // A read holding nothing but ESC bytes is Esc presses, one per byte,
        // unless it can be the first half of a string terminator split across
        // reads. Keys never reach the parser, so they leave no ESC behind.
        let only_escapes = !chunk.is_empty() && chunk.iter().all(|&b| b == ESC);
        if only_escapes && !self.in_string && self.last_byte != ESC {
            self.last_byte = 0;
            return chunk
                .iter()
                .map(|_| TerminalEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
                .collect();
        }

        self.track_strings(chunk);
        self.parser.advance(&mut self.collector, chunk);
        std::mem::take(&mut self.collector.events)
    }

    fn track_strings(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            match (self.last_byte, byte) {
                (ESC, b']') | (ESC, b'P') => self.in_string = true,
                (ESC, b'\\') | (_, BEL) => self.in_string = false,
                _ => {}
            }
            self.last_byte = byte;
        }
    }
}

#[derive(Default)]
struct Collector {
    events: Vec<TerminalEvent>,
    dcs: Option<Vec<u8>>,
}

impl Perform for Collector {
    fn execute(&mut self, byte: u8) {
        if byte == CTRL_C {
            self.events.push(TerminalEvent::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            )));
        }
    }

    fn hook(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: char) {
        // Rebuild the text between `ESC P` and the data, e.g. `1+r`. An
        // absent parameter comes through as 0.
        let mut head = Vec::new();
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                head.push(b';');
            }
            for (j, sub) in param.iter().enumerate() {
                if j > 0 {
                    head.push(b':');
                }
                head.extend_from_slice(sub.to_string().as_bytes());
            }
        }
        head.extend_from_slice(intermediates);
        let mut action_buf = [0u8; 4];
        head.extend_from_slice(action.encode_utf8(&mut action_buf).as_bytes());
        self.dcs = Some(head);
    }

    fn put(&mut self, byte: u8) {
        if let Some(buf) = self.dcs.as_mut() {
            buf.push(byte);
        }
    }

    fn unhook(&mut self) {
        if let Some(payload) = self.dcs.take() {
            self.events
                .push(TerminalEvent::Escape(EscapeKind::Dcs, payload));
        }
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        let payload = params.join(&b';');
        self.events
            .push(TerminalEvent::Escape(EscapeKind::Osc, payload));
    }
}
