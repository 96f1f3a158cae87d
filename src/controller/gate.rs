use thiserror::Error;

pub type GateResult<T> = std::result::Result<T, GateError>;

/// Save lifecycle per attempt: `Idle -> Saving -> Idle`. No intermediate
/// states and no cancellation of an in-flight save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("no save attempt in flight to finish")]
    NotSaving,
}

/// Single-flight guard for save submissions. Acts as a mutual-exclusion gate
/// with no queueing: a begin attempt while saving is dropped, not deferred.
#[derive(Debug, Default)]
pub struct SaveGate {
    state: SaveState,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn is_saving(&self) -> bool {
        self.state == SaveState::Saving
    }

    /// Claims the gate for a new save attempt. Returns `false` while an
    /// attempt is already in flight; the caller must drop the submission.
    pub fn try_begin(&mut self) -> bool {
        match self.state {
            SaveState::Idle => {
                tracing::debug!("save gate claimed");
                self.state = SaveState::Saving;
                true
            }
            SaveState::Saving => {
                tracing::warn!("save requested while another attempt is in flight; dropping");
                false
            }
        }
    }

    /// Releases the gate once the attempt's outcome is known. Must be called
    /// exactly once per accepted attempt, success or failure.
    pub fn finish(&mut self) -> GateResult<()> {
        match self.state {
            SaveState::Saving => {
                tracing::debug!("save gate released");
                self.state = SaveState::Idle;
                Ok(())
            }
            SaveState::Idle => Err(GateError::NotSaving),
        }
    }
}
