//! Termination signal capture
//!
//! Handlers only record the first signal delivered; the event loop polls for
//! it between callbacks. After the terminal is restored the caller re-raises
//! the signal with its default disposition so the parent shell sees a normal
//! signal death.

use std::io;

/// A termination signal that ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathSignal(i32);

impl DeathSignal {
    pub fn from_raw(signal: i32) -> Self {
        DeathSignal(signal)
    }

    pub fn number(self) -> i32 {
        self.0
    }

    /// Conventional exit status of a process killed by this signal
    pub fn exit_status(self) -> u8 {
        (128 + self.0).clamp(0, 255) as u8
    }
}

#[cfg(unix)]
mod imp {
    use super::DeathSignal;
    use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
    use std::io;
    use std::sync::atomic::{AtomicI32, Ordering};

    const TERMINATION_SIGNALS: [Signal; 4] = [
        Signal::SIGINT,
        Signal::SIGTERM,
        Signal::SIGHUP,
        Signal::SIGQUIT,
    ];

    // 0 means no signal has been delivered
    static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);

    extern "C" fn record_signal(signal: libc::c_int) {
        let _ = PENDING_SIGNAL.compare_exchange(0, signal, Ordering::AcqRel, Ordering::Acquire);
    }

    pub fn install() -> io::Result<()> {
        // No SA_RESTART: a blocking read returns EINTR so the loop notices
        let action = SigAction::new(
            SigHandler::Handler(record_signal),
            SaFlags::empty(),
            SigSet::empty(),
        );
        for sig in TERMINATION_SIGNALS {
            // SAFETY: the handler only performs a lock-free atomic store
            unsafe { signal::sigaction(sig, &action) }.map_err(io::Error::from)?;
        }
        Ok(())
    }

    pub fn take_pending() -> Option<DeathSignal> {
        match PENDING_SIGNAL.swap(0, Ordering::AcqRel) {
            0 => None,
            n => Some(DeathSignal(n)),
        }
    }

    pub fn name(sig: DeathSignal) -> String {
        Signal::try_from(sig.0)
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|_| format!("signal {}", sig.0))
    }

    pub fn reraise(sig: DeathSignal) -> io::Result<()> {
        let signal = Signal::try_from(sig.0).map_err(io::Error::from)?;
        // SAFETY: restoring the default disposition installs no Rust code
        unsafe { signal::signal(signal, SigHandler::SigDfl) }.map_err(io::Error::from)?;
        signal::raise(signal).map_err(io::Error::from)
    }
}

#[cfg(not(unix))]
mod imp {
    use super::DeathSignal;
    use std::io;

    pub fn install() -> io::Result<()> {
        Ok(())
    }

    pub fn take_pending() -> Option<DeathSignal> {
        None
    }

    pub fn name(sig: DeathSignal) -> String {
        format!("signal {}", sig.0)
    }

    pub fn reraise(sig: DeathSignal) -> io::Result<()> {
        std::process::exit(i32::from(sig.exit_status()))
    }
}

/// Route termination signals to the pending-signal slot
pub fn install() -> io::Result<()> {
    imp::install()
}

/// Take the delivered signal, if any
pub fn take_pending() -> Option<DeathSignal> {
    imp::take_pending()
}

impl DeathSignal {
    pub fn name(self) -> String {
        imp::name(self)
    }

    /// Kill the current process with this signal. Only returns if the signal
    /// could not be delivered.
    pub fn reraise(self) -> io::Result<()> {
        imp::reraise(self)
    }
}
