//! Controlling terminal access
//!
//! Payload data owns stdin and stdout, so protocol traffic goes through the
//! controlling terminal device directly.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::sync::mpsc::{Receiver, channel};

use super::{Demultiplexer, TerminalEvent};

const TTY_PATH: &str = "/dev/tty";
const READ_BUFFER_SIZE: usize = 4096;

/// The controlling terminal in raw mode, with its input already running
/// through the demultiplexer on a background thread
pub struct Tty {
    writer: File,
    events: Receiver<TerminalEvent>,
    raw_mode: RawModeGuard,
}

impl Tty {
    pub fn open() -> io::Result<Self> {
        let writer = OpenOptions::new().read(true).write(true).open(TTY_PATH)?;
        let reader = writer.try_clone()?;
        let raw_mode = RawModeGuard::enable()?;

        #[cfg(debug_assertions)]
        log::debug!("Raw mode enabled on {}", TTY_PATH);

        Ok(Tty {
            writer,
            events: spawn_reader(reader),
            raw_mode,
        })
    }

    /// Split into the event loop's output and input. Raw mode lasts as long
    /// as the returned guard.
    pub fn into_parts(self) -> (File, Receiver<TerminalEvent>, RawModeGuard) {
        (self.writer, self.events, self.raw_mode)
    }
}

/// Leaves raw mode on drop, and on panic
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            hook(info);
        }));

        enable_raw_mode()?;
        Ok(RawModeGuard { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Read terminal input on a background thread until the loop goes away
fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> Receiver<TerminalEvent> {
    let (tx, rx) = channel();

    std::thread::spawn(move || {
        let mut demux = Demultiplexer::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_e) => {
                    #[cfg(debug_assertions)]
                    log::error!("Terminal read failed: {}", _e);
                    break;
                }
            };
            for event in demux.feed(&buf[..n]) {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    });

    rx
}
