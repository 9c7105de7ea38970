use std::fmt;

use crate::{config::Wave, relay::SourceId};

/// The exit code reported for a worker that panicked.
pub const PANIC_EXIT_CODE: i32 = 101;

/// The harness' result type.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// All errors that end a harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// A worker returned an error from its loop.
    WorkerFault {
        worker: SourceId,
        wave: Wave,
        code: i32,
        reason: String,
    },
    /// A worker panicked, its loop never returned.
    WorkerPanicked {
        worker: SourceId,
        wave: Wave,
        message: String,
    },
}

impl HarnessError {
    /// The failing worker.
    pub fn worker(&self) -> SourceId {
        match self {
            Self::WorkerFault { worker, .. } | Self::WorkerPanicked { worker, .. } => *worker,
        }
    }

    /// The exit code of the failing worker, never `0`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::WorkerFault { code, .. } => *code,
            Self::WorkerPanicked { .. } => PANIC_EXIT_CODE,
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerFault {
                worker,
                wave,
                code,
                reason,
            } => write!(
                f,
                "worker {worker} of the {wave} wave stopped with exit code {code}: {reason}"
            ),
            Self::WorkerPanicked {
                worker,
                wave,
                message,
            } => write!(
                f,
                "worker {worker} of the {wave} wave panicked (exit code {PANIC_EXIT_CODE}): {message}"
            ),
        }
    }
}

impl std::error::Error for HarnessError {}
