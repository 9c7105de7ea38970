use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, info};

use super::{Fault, FaultKind, LoopSchedule, PlannedWrite, Result, WorkerConfig, WorkerErr};
use crate::{
    relay::{Msg, RelaySender, SourceId},
    reporting::{FinalState, ProgressReporter, ProgressSnapshot},
    storage::Element,
};

/// What a worker leaves behind once its loop is over.
#[derive(Debug, Clone)]
pub struct WorkerResult<T: Element> {
    pub source: SourceId,
    pub exit_code: i32,
    pub elapsed: Duration,
    /// Both buffers, `(A, B)`, as seen right after the loop.
    pub final_state: (Vec<T>, Vec<T>),
    pub writes: u64,
    /// Every write attempted, only kept when the config asks for it.
    pub journal: Vec<PlannedWrite>,
}

impl<T: Element> WorkerResult<T> {
    /// The result of a worker that never reached the end of its loop, as observed from outside.
    ///
    /// # Arguments
    /// * `source` - The failing worker.
    /// * `exit_code` - Its non-zero exit code.
    /// * `elapsed` - The time since it was spawned.
    /// * `final_state` - The last known state of both buffers.
    pub fn faulted(
        source: SourceId,
        exit_code: i32,
        elapsed: Duration,
        final_state: (Vec<T>, Vec<T>),
    ) -> Self {
        Self {
            source,
            exit_code,
            elapsed,
            final_state,
            writes: 0,
            journal: Vec::new(),
        }
    }
}

/// A single execution unit hammering the shared buffers.
///
/// It runs its loop on the calling thread until completion or fault, nothing can interrupt it
/// from the outside. Everything it has to say goes through its relay.
pub struct Worker<T: Element> {
    config: WorkerConfig<T>,
    relay: RelaySender<Msg<T>>,
}

impl<T: Element> Worker<T> {
    /// Creates a new `Worker`.
    ///
    /// # Args
    /// * `config` - The worker's immutable setup.
    /// * `relay` - The worker's only channel to the coordinator.
    ///
    /// # Returns
    /// A new worker instance.
    pub fn new(config: WorkerConfig<T>, relay: RelaySender<Msg<T>>) -> Self {
        Self { config, relay }
    }

    pub fn source(&self) -> SourceId {
        self.relay.source()
    }

    /// Runs the stress loop to completion.
    ///
    /// # Returns
    /// The worker's final state on completion.
    ///
    /// # Errors
    /// Returns a `WorkerErr` if the loop faults, the worker then relays nothing else.
    ///
    /// # Panics
    /// If the config has a report interval and this isn't called within a tokio runtime, or if
    /// an injected `FaultKind::Panic` is reached.
    pub fn run(self) -> Result<WorkerResult<T>> {
        let Self { config, relay } = self;
        let source = relay.source();
        let buffers = config.buffers();
        let mode = config.mode();
        let start = Instant::now();

        relay.log("new thread executing");
        debug!(
            source = source.0,
            index = config.worker_index(),
            elements = config.element_count(),
            atomic = mode.is_atomic();
            "worker started"
        );

        let reporter = config
            .report_interval()
            .map(|period| ProgressReporter::spawn(period, buffers.clone(), relay.clone()));
        let _stop_reporting = reporter.as_ref().map(ProgressReporter::cancel_on_drop);

        let LoopSchedule {
            iterations,
            progress_every,
            write_every,
        } = config.schedule();
        let fault_at = config.fault().map_or(0, |fault| fault.iteration);

        let mut rng = rand::rng();
        let mut writes = 0;
        let mut journal = Vec::new();

        for i in 1..=iterations {
            if i % progress_every.get() == 0 {
                relay.send(Msg::Progress(ProgressSnapshot::take(source, buffers)));
            }

            if i == fault_at {
                raise(config.fault(), source)?;
            }

            if i % write_every.get() == 0 {
                let write = PlannedWrite::draw(&mut rng, i, buffers);
                write
                    .apply(buffers, mode)
                    .map_err(|source| WorkerErr::OutOfBounds {
                        iteration: i,
                        source,
                    })?;

                writes += 1;
                if config.records_writes() {
                    journal.push(write);
                }
            }
        }

        if let Some(reporter) = &reporter {
            reporter.cancel();
        }

        let elapsed = start.elapsed();
        let (buffer_a, buffer_b) = buffers.snapshot();

        relay.send(Msg::Final(FinalState {
            timestamp: Utc::now(),
            source,
            buffer_a: buffer_a.clone(),
            buffer_b: buffer_b.clone(),
            elapsed,
        }));
        relay.log(format!(
            "new {mode} thread finished in {}ms",
            elapsed.as_millis()
        ));
        info!(source = source.0, writes = writes; "worker finished");

        Ok(WorkerResult {
            source,
            exit_code: 0,
            elapsed,
            final_state: (buffer_a, buffer_b),
            writes,
            journal,
        })
    }
}

fn raise(fault: Option<Fault>, source: SourceId) -> Result<()> {
    let Some(fault) = fault else {
        return Ok(());
    };
    debug!(source = source.0, iteration = fault.iteration; "raising injected fault");

    match fault.kind {
        FaultKind::Error => Err(WorkerErr::Injected {
            iteration: fault.iteration,
        }),
        FaultKind::Panic => panic!(
            "worker {source} hit an injected panic at iteration {}",
            fault.iteration
        ),
    }
}
