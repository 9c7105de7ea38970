use std::time::{Duration, Instant};

use crate::{config::Wave, relay::SourceId, storage::Element, worker::WorkerResult};

/// What the coordinator remembers about a running worker.
#[derive(Debug, Clone, Copy)]
pub(super) struct WorkerTag {
    pub source: SourceId,
    pub wave: Wave,
    pub index: usize,
    pub started: Instant,
}

/// The outcome of a run where every worker exited with code `0`.
#[derive(Debug, Clone)]
pub struct RunSummary<T: Element> {
    /// One result per worker, in completion order.
    pub results: Vec<WorkerResult<T>>,
    /// Both buffers, `(A, B)`, once every worker is done.
    pub final_state: (Vec<T>, Vec<T>),
    pub elapsed: Duration,
}

impl<T: Element> RunSummary<T> {
    pub fn exit_codes(&self) -> impl Iterator<Item = i32> + '_ {
        self.results.iter().map(|result| result.exit_code)
    }

    /// The result of the worker that printed as `source`.
    pub fn result_of(&self, source: SourceId) -> Option<&WorkerResult<T>> {
        self.results.iter().find(|result| result.source == source)
    }
}
