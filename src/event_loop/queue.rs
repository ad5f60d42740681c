/// Bytes waiting to be written to the terminal, in the order they were queued.
///
/// Handlers only append; the event loop drains the queue to the tty between
/// callbacks, so a handler never blocks on terminal output.
#[derive(Debug, Default)]
pub struct WriteQueue {
    pending: Vec<u8>,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_write(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    pub fn queue_write_str(&mut self, data: &str) {
        self.queue_write(data.as_bytes());
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pending
    }

    /// Hand everything queued so far to the caller
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }
}
