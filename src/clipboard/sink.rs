use std::io::Write;

use crate::error::ClipError;

/// How a transfer ended
#[derive(Debug)]
pub enum Outcome {
    /// Finished; carries the clipboard contents for read transfers
    Completed(Option<Vec<u8>>),
    Aborted(ClipError),
    Failed(ClipError),
}

impl Outcome {
    #[cfg(test)]
    pub(crate) fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

/// Delivers the outcome: payload bytes to `out`, failures to `err`
pub struct ResultSink<O, E> {
    out: O,
    err: E,
}

impl<O: Write, E: Write> ResultSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        ResultSink { out, err }
    }

    /// Report `outcome` and return the process exit status
    pub fn deliver(&mut self, outcome: Outcome) -> u8 {
        match outcome {
            Outcome::Completed(Some(payload)) if !payload.is_empty() => {
                match self.write_payload(&payload) {
                    Ok(()) => 0,
                    Err(e) => self.report(&ClipError::WriteOutput(e)),
                }
            }
            Outcome::Completed(_) => 0,
            Outcome::Aborted(error) | Outcome::Failed(error) => self.report(&error),
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_payload(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.out.write_all(payload)?;
        self.out.flush()
    }

    fn report(&mut self, error: &ClipError) -> u8 {
        let _ = writeln!(self.err, "Error: {}", error);
        let _ = self.err.flush();
        1
    }
}
