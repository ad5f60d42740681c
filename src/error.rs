use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("failed to read from STDIN: {0}")]
    ReadInput(#[source] std::io::Error),

    #[error("invalid encoded data from terminal: {0}")]
    InvalidEncodedData(#[from] base64::DecodeError),

    #[error("aborted by user")]
    AbortedByUser,

    #[error("terminated by signal: {0}")]
    TerminatedBySignal(String),

    #[error("streaming encoder written to after close")]
    EncoderClosed,

    #[error("failed to write to STDOUT: {0}")]
    WriteOutput(#[source] std::io::Error),

    #[error("terminal I/O error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl ClipError {
    /// Failures the user asked for, as opposed to ones that happened to them.
    #[cfg(test)]
    pub(crate) fn is_user_initiated(&self) -> bool {
        matches!(self, ClipError::AbortedByUser)
    }
}
