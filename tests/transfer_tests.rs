//! End-to-end transfers against a simulated terminal
//!
//! The terminal side parses what the transfer writes with the same
//! demultiplexer the binary uses, so these tests exercise the full byte path.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::{self, Write};
use std::sync::mpsc::{Sender, channel};
use std::sync::{Arc, Mutex};

use termclip::clipboard::{Outcome, SourceKind, TransferOptions, TransferStateMachine};
use termclip::event_loop::{
    DeathSignal, Demultiplexer, EscapeKind, EventLoop, TerminalEvent,
};

fn no_signal() -> Option<DeathSignal> {
    None
}

/// Minimal terminal: stores OSC 52 writes, answers OSC 52 reads and the
/// XTGETTCAP acknowledgment request
struct FakeTerminal {
    demux: Demultiplexer,
    replies: Sender<TerminalEvent>,
    clipboard: Arc<Mutex<Vec<u8>>>,
    supports_read: bool,
    received: Arc<Mutex<Vec<u8>>>,
}

impl Write for FakeTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.received.lock().unwrap().extend_from_slice(buf);
        for event in self.demux.feed(buf) {
            let TerminalEvent::Escape(kind, payload) = event else {
                continue;
            };
            let text = String::from_utf8(payload).unwrap();
            match kind {
                EscapeKind::Osc => {
                    let fields: Vec<&str> = text.splitn(3, ';').collect();
                    if fields[0] != "52" {
                        continue;
                    }
                    if fields[2] == "?" {
                        let reply = if self.supports_read {
                            let data = self.clipboard.lock().unwrap();
                            format!("52;{};{}", fields[1], STANDARD.encode(&*data))
                        } else {
                            format!("52;{}", fields[1])
                        };
                        let _ = self
                            .replies
                            .send(TerminalEvent::Escape(EscapeKind::Osc, reply.into_bytes()));
                    } else {
                        *self.clipboard.lock().unwrap() = STANDARD.decode(fields[2]).unwrap();
                    }
                }
                EscapeKind::Dcs => {
                    // vte reports the missing parameter as 0
                    if text.ends_with("+q544e") {
                        let _ = self.replies.send(TerminalEvent::Escape(
                            EscapeKind::Dcs,
                            b"1+r544e=7465726d636c6970".to_vec(),
                        ));
                    }
                }
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Session {
    clipboard: Arc<Mutex<Vec<u8>>>,
    received: Arc<Mutex<Vec<u8>>>,
    outcome: Outcome,
}

fn run_transfer(
    options: TransferOptions,
    input: &[u8],
    kind: SourceKind,
    initial_clipboard: &[u8],
    supports_read: bool,
) -> Session {
    let (tx, rx) = channel();
    let clipboard = Arc::new(Mutex::new(initial_clipboard.to_vec()));
    let received = Arc::new(Mutex::new(Vec::new()));
    let terminal = FakeTerminal {
        demux: Demultiplexer::new(),
        replies: tx,
        clipboard: Arc::clone(&clipboard),
        supports_read,
        received: Arc::clone(&received),
    };

    let mut machine = TransferStateMachine::new(options, input, kind);
    let mut event_loop = EventLoop::new(terminal, rx).with_signal_probe(no_signal);
    assert_eq!(event_loop.run(&mut machine), None);

    Session {
        clipboard,
        received,
        outcome: machine.into_outcome(),
    }
}

#[test]
fn test_large_piped_copy_reaches_clipboard() {
    let input: Vec<u8> = (0..200_000u32).map(|i| (i * 31 % 251) as u8).collect();
    let options = TransferOptions {
        chunk_size: 8191,
        ..TransferOptions::default()
    };

    let session = run_transfer(options, &input, SourceKind::Piped, b"", true);

    assert!(matches!(session.outcome, Outcome::Completed(None)));
    assert_eq!(*session.clipboard.lock().unwrap(), input);
    let received = session.received.lock().unwrap();
    assert!(received.starts_with(b"\x1b]52;c;"));
    assert!(received.ends_with(b"\x1b\\"));
}

#[test]
fn test_copy_with_acknowledgment() {
    let options = TransferOptions {
        wait_for_ack: true,
        ..TransferOptions::default()
    };

    let session = run_transfer(options, b"acknowledged", SourceKind::Piped, b"", true);

    assert!(matches!(session.outcome, Outcome::Completed(None)));
    assert_eq!(*session.clipboard.lock().unwrap(), b"acknowledged");
}

#[test]
fn test_paste_returns_clipboard_contents() {
    let options = TransferOptions {
        request_from_terminal: true,
        ..TransferOptions::default()
    };

    let session = run_transfer(options, b"", SourceKind::Interactive, b"from the terminal", true);

    match session.outcome {
        Outcome::Completed(Some(data)) => assert_eq!(data, b"from the terminal"),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(*session.received.lock().unwrap(), b"\x1b]52;c;?\x1b\\");
}

#[test]
fn test_piped_paste_reads_back_what_was_copied() {
    let options = TransferOptions {
        request_from_terminal: true,
        use_primary: true,
        ..TransferOptions::default()
    };

    let session = run_transfer(options, b"round trip", SourceKind::Piped, b"old", true);

    match session.outcome {
        Outcome::Completed(Some(data)) => assert_eq!(data, b"round trip"),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn test_paste_from_terminal_without_read_support() {
    let options = TransferOptions {
        request_from_terminal: true,
        ..TransferOptions::default()
    };

    let session = run_transfer(options, b"", SourceKind::Interactive, b"secret", false);

    assert!(matches!(session.outcome, Outcome::Completed(None)));
}
