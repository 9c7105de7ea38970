mod config;
mod error;
mod schedule;
#[allow(clippy::module_inception)]
mod worker;
mod write;

pub use config::{Fault, FaultKind, WorkerConfig};
pub use error::{Result, WorkerErr};
pub use schedule::{
    DEFAULT_ITERATIONS, DEFAULT_PROGRESS_EVERY, DEFAULT_WRITE_EVERY, LoopSchedule,
};
pub use worker::{Worker, WorkerResult};
pub use write::{PlannedWrite, planned_value};
