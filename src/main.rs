use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use termclip::clipboard::{ResultSink, SourceKind, TransferOptions, TransferStateMachine};
use termclip::config::{self, Config};
use termclip::event_loop::{EventLoop, Tty, signals};

/// Copy to and paste from the terminal clipboard
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Copy to and paste from the terminal clipboard over OSC 52",
    long_about = "Copy to and paste from the terminal clipboard over OSC 52.\n\n\
        Data piped into STDIN is copied to the clipboard. With --get-clipboard \
        the clipboard contents are written to STDOUT. Both work over SSH, as \
        long as the terminal emulator supports OSC 52."
)]
struct Args {
    /// Write the current clipboard contents to STDOUT
    #[arg(short = 'g', long)]
    get_clipboard: bool,

    /// Use the primary selection instead of the clipboard
    #[arg(short = 'p', long)]
    use_primary: bool,

    /// Wait until the terminal confirms it received the data before exiting
    #[arg(long)]
    wait_for_completion: bool,

    /// Number of bytes read from STDIN at a time
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: Option<u64>,
}

impl Args {
    /// Command line flags on top of the config file defaults
    fn transfer_options(&self, config: &Config) -> TransferOptions {
        let mut options = TransferOptions::from_config(config);
        options.request_from_terminal = self.get_clipboard;
        options.use_primary |= self.use_primary;
        options.wait_for_ack |= self.wait_for_completion;
        if let Some(size) = self.chunk_size {
            options.chunk_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
        options
    }
}

fn main() -> Result<ExitCode> {
    // Writes to /tmp/termclip-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    {
        use std::io::Write;

        if let Ok(log_file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/termclip-debug.log")
        {
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Debug)
                .target(env_logger::Target::Pipe(Box::new(log_file)))
                .format(|buf, record| {
                    use std::time::SystemTime;
                    let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
                    writeln!(
                        buf,
                        "[{}] [{}] {}",
                        datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                        record.level(),
                        record.args()
                    )
                })
                .init();
        }

        log::debug!("=== TERMCLIP DEBUG SESSION STARTED ===");
    }

    color_eyre::install()?;

    let config_result = config::load_config();

    let args = Args::parse();

    if let Some(warning) = &config_result.warning {
        eprintln!("Warning: {}", warning);
    }

    let options = args.transfer_options(&config_result.config);

    let stdin = io::stdin();
    let source_kind = if stdin.is_terminal() {
        SourceKind::Interactive
    } else {
        SourceKind::Piped
    };

    #[cfg(debug_assertions)]
    log::debug!("Starting transfer: {:?}, source {:?}", options, source_kind);

    signals::install().wrap_err("Failed to install signal handlers")?;

    let tty = Tty::open().wrap_err("Failed to open the controlling terminal")?;
    let (writer, events, raw_mode) = tty.into_parts();

    let mut machine = TransferStateMachine::new(options, stdin.lock(), source_kind);
    let mut event_loop = EventLoop::new(writer, events);
    let death_signal = event_loop.run(&mut machine);

    // Output after terminal restore to prevent corruption
    drop(raw_mode);

    let outcome = machine.into_outcome();
    let mut sink = ResultSink::new(io::stdout().lock(), io::stderr().lock());
    let status = sink.deliver(outcome);

    #[cfg(debug_assertions)]
    log::debug!("=== TERMCLIP DEBUG SESSION ENDED ({}) ===", status);

    if let Some(signal) = death_signal {
        drop(sink);
        // Only returns when the signal could not be delivered
        let _ = signal.reraise();
        return Ok(ExitCode::from(signal.exit_status()));
    }

    Ok(ExitCode::from(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("termclip").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_come_from_config() {
        let mut config = Config::default();
        config.transfer.use_primary = true;
        config.transfer.chunk_size = 64;

        let options = parse(&[]).transfer_options(&config);
        assert!(options.use_primary);
        assert!(!options.request_from_terminal);
        assert!(!options.wait_for_ack);
        assert_eq!(options.chunk_size, 64);
    }

    #[test]
    fn test_flags_override_config() {
        let options = parse(&["-g", "-p", "--wait-for-completion", "--chunk-size", "16"])
            .transfer_options(&Config::default());
        assert!(options.request_from_terminal);
        assert!(options.use_primary);
        assert!(options.wait_for_ack);
        assert_eq!(options.chunk_size, 16);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = Args::try_parse_from(["termclip", "--chunk-size", "0"]);
        assert!(result.is_err());
    }
}
