use crate::error::ClipError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Sending,
    AwaitingAck,
    AwaitingData,
    Completed,
    Aborted,
    Failed,
}

impl Phase {
    /// Waiting on the terminal, the only phases where cancellation counts
    pub fn is_waiting(self) -> bool {
        matches!(self, Phase::AwaitingAck | Phase::AwaitingData)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Aborted | Phase::Failed)
    }
}

/// Progress of the two-step cancel within one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelStage {
    #[default]
    Idle,
    /// The user has been told a second request aborts
    Warned,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Ignored,
    Warn,
    Abort,
}

/// Mutable state of one transfer, owned by the state machine
#[derive(Debug)]
pub struct TransferState {
    phase: Phase,
    cancel: CancelStage,
    received_payload: Option<Vec<u8>>,
    error: Option<ClipError>,
}

impl Default for TransferState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferState {
    pub fn new() -> Self {
        TransferState {
            phase: Phase::Sending,
            cancel: CancelStage::Idle,
            received_payload: None,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cancel_stage(&self) -> CancelStage {
        self.cancel
    }

    pub fn cancel_attempts(&self) -> u32 {
        match self.cancel {
            CancelStage::Idle => 0,
            CancelStage::Warned => 1,
            CancelStage::Confirmed => 2,
        }
    }

    pub fn received_payload(&self) -> Option<&[u8]> {
        self.received_payload.as_deref()
    }

    pub fn error(&self) -> Option<&ClipError> {
        self.error.as_ref()
    }

    /// Leave `Sending` for one of the waits. No-op from any other phase.
    pub fn begin_wait(&mut self, phase: Phase) {
        debug_assert!(phase.is_waiting());
        if self.phase == Phase::Sending {
            self.phase = phase;
            self.cancel = CancelStage::Idle;
        }
    }

    pub fn complete(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Completed;
        }
    }

    /// Record the clipboard contents and finish. Only accepted once, while
    /// waiting for data.
    pub fn complete_with_payload(&mut self, payload: Vec<u8>) {
        if self.phase != Phase::AwaitingData || self.received_payload.is_some() {
            return;
        }
        self.received_payload = Some(payload);
        self.phase = Phase::Completed;
    }

    pub fn fail(&mut self, error: ClipError) {
        if self.phase.is_terminal() {
            return;
        }
        self.error = Some(error);
        self.phase = Phase::Failed;
    }

    pub fn register_cancel(&mut self) -> CancelOutcome {
        if !self.phase.is_waiting() {
            return CancelOutcome::Ignored;
        }
        match self.cancel {
            CancelStage::Idle => {
                self.cancel = CancelStage::Warned;
                CancelOutcome::Warn
            }
            CancelStage::Warned | CancelStage::Confirmed => {
                self.cancel = CancelStage::Confirmed;
                self.error = Some(ClipError::AbortedByUser);
                self.phase = Phase::Aborted;
                CancelOutcome::Abort
            }
        }
    }

    pub(crate) fn into_parts(self) -> (Phase, Option<Vec<u8>>, Option<ClipError>) {
        (self.phase, self.received_payload, self.error)
    }
}
