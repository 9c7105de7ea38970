use std::{error::Error, fmt};

use crate::storage::OutOfBoundsErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker loop failures. Any of them terminates the worker with a non-zero exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerErr {
    OutOfBounds {
        iteration: u64,
        source: OutOfBoundsErr,
    },
    Injected {
        iteration: u64,
    },
}

impl WorkerErr {
    /// The exit code a worker terminated by this error reports.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkerErr::OutOfBounds { .. } => 2,
            WorkerErr::Injected { .. } => 1,
        }
    }
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::OutOfBounds { iteration, source } => {
                write!(f, "write at iteration {iteration} failed: {source}")
            }
            WorkerErr::Injected { iteration } => {
                write!(f, "injected fault at iteration {iteration}")
            }
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::OutOfBounds { source, .. } => Some(source),
            WorkerErr::Injected { .. } => None,
        }
    }
}
