//! Job failure taxonomy

use thiserror::Error;

/// Why an async job resolved without a result
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AsyncJobError {
    /// Steam reported that the job failed
    #[error("Async job failed remotely")]
    RemoteFailure,

    /// No response arrived before the job timed out, or pending jobs were cancelled
    #[error("Async job was cancelled")]
    Cancelled,
}

impl AsyncJobError {
    pub fn from_remote(due_to_remote_failure: bool) -> Self {
        if due_to_remote_failure {
            Self::RemoteFailure
        } else {
            Self::Cancelled
        }
    }
}
