use std::time::Duration;

use super::LoopSchedule;
use crate::storage::{BufferPair, Element, WriteMode};

/// What happens when an injected fault is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The loop returns a `WorkerErr::Injected`.
    Error,
    /// The loop panics.
    Panic,
}

/// A fault the worker raises once its loop counter reaches `iteration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub iteration: u64,
    pub kind: FaultKind,
}

/// Immutable setup of a single worker, built by the coordinator at spawn time.
#[derive(Clone)]
pub struct WorkerConfig<T: Element> {
    buffers: BufferPair<T>,
    element_count: usize,
    mode: WriteMode,
    worker_index: usize,
    schedule: LoopSchedule,
    report_interval: Option<Duration>,
    fault: Option<Fault>,
    record_writes: bool,
}

impl<T: Element> WorkerConfig<T> {
    /// Creates a new worker configuration with the default loop schedule.
    ///
    /// # Args
    /// * `buffers` - Handles to the shared buffers, never copied.
    /// * `use_atomic_writes` - Whether writes are atomic exchanges or direct stores.
    /// * `worker_index` - Position of the worker within its wave.
    ///
    /// # Returns
    /// A `WorkerConfig` instance.
    pub fn new(buffers: BufferPair<T>, use_atomic_writes: bool, worker_index: usize) -> Self {
        Self {
            element_count: buffers.len(),
            buffers,
            mode: WriteMode::from_atomic(use_atomic_writes),
            worker_index,
            schedule: LoopSchedule::default(),
            report_interval: None,
            fault: None,
            record_writes: false,
        }
    }

    pub fn with_schedule(mut self, schedule: LoopSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Makes the worker own a `ProgressReporter` firing every `period`.
    pub fn with_report_interval(mut self, period: Option<Duration>) -> Self {
        self.report_interval = period;
        self
    }

    pub fn with_fault(mut self, fault: Option<Fault>) -> Self {
        self.fault = fault;
        self
    }

    /// Makes the worker keep every write it attempts in its `WorkerResult`.
    pub fn recording_writes(mut self, record_writes: bool) -> Self {
        self.record_writes = record_writes;
        self
    }

    pub fn buffers(&self) -> &BufferPair<T> {
        &self.buffers
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn use_atomic_writes(&self) -> bool {
        self.mode.is_atomic()
    }

    pub fn worker_index(&self) -> usize {
        self.worker_index
    }

    pub fn schedule(&self) -> LoopSchedule {
        self.schedule
    }

    pub fn report_interval(&self) -> Option<Duration> {
        self.report_interval
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn records_writes(&self) -> bool {
        self.record_writes
    }
}
