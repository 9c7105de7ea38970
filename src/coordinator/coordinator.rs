use std::{
    any::Any,
    collections::HashMap,
    io::Write,
    time::Instant,
};

use futures::{FutureExt, future::OptionFuture};
use log::{debug, error, info, warn};
use tokio::{
    task::{self, JoinError, JoinSet},
    time,
};

use super::{RunSummary, summary::WorkerTag};
use crate::{
    config::{HarnessConfig, Wave},
    error::{HarnessError, PANIC_EXIT_CODE, Result},
    relay::{self, LogRecord, Msg, RelayHub, SourceId},
    reporting::{ProgressReporter, ProgressSnapshot},
    storage::{BufferPair, Element},
    worker::{self, Worker, WorkerConfig, WorkerResult},
};

type Joined<T> = std::result::Result<(task::Id, worker::Result<WorkerResult<T>>), JoinError>;

/// Owns the shared buffers, runs both waves of workers and prints everything they relay.
///
/// Every line of output, its own included, goes to `out` as `[<timestamp>] (<pid>-<source>)
/// <text>`.
pub struct Coordinator<T: Element, W: Write> {
    config: HarnessConfig,
    buffers: BufferPair<T>,
    out: W,
    pid: u32,
    hub: RelayHub<Msg<T>>,
    workers: JoinSet<worker::Result<WorkerResult<T>>>,
    tags: HashMap<task::Id, WorkerTag>,
    next_source: usize,
    reporter: Option<ProgressReporter>,
    results: Vec<WorkerResult<T>>,
}

impl<T: Element, W: Write> Coordinator<T, W> {
    /// Creates a new `Coordinator` and initializes both buffers with `1..=element_count`.
    ///
    /// # Arguments
    /// * `config` - The setup of the run.
    /// * `out` - Where every line of output is written.
    ///
    /// # Returns
    /// A coordinator ready to `run`.
    pub fn new(config: HarnessConfig, out: W) -> Self {
        let buffers = BufferPair::initialize(config.element_count.get());

        Self {
            config,
            buffers,
            out,
            pid: std::process::id(),
            hub: RelayHub::new(),
            workers: JoinSet::new(),
            tags: HashMap::new(),
            next_source: SourceId::COORDINATOR.0 + 1,
            reporter: None,
            results: Vec::new(),
        }
    }

    pub fn buffers(&self) -> &BufferPair<T> {
        &self.buffers
    }

    /// Runs both waves until every worker exited and every relay was drained.
    ///
    /// # Returns
    /// A summary of the run.
    ///
    /// # Errors
    /// Returns a `HarnessError` as soon as any worker exits with a non-zero code. The workers
    /// still running are left behind.
    pub async fn run(mut self) -> Result<RunSummary<T>> {
        let start = Instant::now();
        self.log("main thread/process started");
        info!(
            pid = self.pid,
            elements = self.buffers.len(),
            workers = self.config.worker_count.get();
            "harness started"
        );

        let (relay, rx) = relay::channel(SourceId::COORDINATOR);
        self.hub.attach(rx);
        self.reporter = Some(ProgressReporter::spawn(
            self.config.report_interval,
            self.buffers.clone(),
            relay,
        ));

        self.spawn_wave(Wave::First);

        let delay = time::sleep(self.config.wave_delay);
        tokio::pin!(delay);
        let mut delay_done = false;
        let mut doubling: Option<task::JoinHandle<()>> = None;
        let mut second_wave = false;

        loop {
            tokio::select! {
                Some(msg) = self.hub.next() => self.emit(msg.into_record()),
                Some(joined) = self.workers.join_next_with_id(), if !self.workers.is_empty() => {
                    if let Err(e) = self.on_worker_exit(joined) {
                        self.stop_reporting();
                        self.flush();
                        return Err(e);
                    }
                }
                _ = &mut delay, if !delay_done => {
                    delay_done = true;
                    // The doubling is bulk work, keep it off the thread draining the relays.
                    let buffers = self.buffers.clone();
                    doubling = Some(task::spawn_blocking(move || buffers.b().double_in_place()));
                }
                Some(doubled) = OptionFuture::from(doubling.as_mut()), if doubling.is_some() => {
                    doubling = None;
                    match doubled {
                        Ok(()) => debug!("second buffer doubled"),
                        Err(e) => error!("failed to double the second buffer: {e}"),
                    }
                    second_wave = true;
                    self.spawn_wave(Wave::Second);
                }
                else => break,
            }

            if second_wave && self.workers.is_empty() {
                self.stop_reporting();
            }
        }

        self.flush();
        let elapsed = start.elapsed();
        info!(workers = self.results.len(), elapsed_ms = elapsed.as_millis() as u64; "harness finished");

        Ok(RunSummary {
            final_state: self.buffers.snapshot(),
            results: self.results,
            elapsed,
        })
    }

    /// Starts one worker per configured worker count on the blocking pool.
    ///
    /// # Arguments
    /// * `wave` - The wave the workers belong to, it decides their write mode.
    ///
    /// # Returns
    /// The sources the new workers print as, in spawn order.
    pub fn spawn_wave(&mut self, wave: Wave) -> Vec<SourceId> {
        let count = self.config.worker_count.get();
        let mut sources = Vec::with_capacity(count);

        for index in 0..count {
            self.log(format!("starting thread {}", index + 1));

            let source = SourceId(self.next_source);
            self.next_source += 1;

            let fault = self
                .config
                .fault
                .and_then(|injected| injected.for_worker(wave, index));
            let config = WorkerConfig::new(self.buffers.clone(), wave.mode().is_atomic(), index)
                .with_schedule(self.config.schedule)
                .with_report_interval(self.config.worker_report_interval)
                .with_fault(fault)
                .recording_writes(self.config.record_writes);

            let (tx, rx) = relay::channel(source);
            self.hub.attach(rx);

            let handle = self
                .workers
                .spawn_blocking(move || Worker::new(config, tx).run());
            self.tags.insert(
                handle.id(),
                WorkerTag {
                    source,
                    wave,
                    index,
                    started: Instant::now(),
                },
            );

            debug!(source = source.0, index = index; "spawned {wave} wave worker");
            sources.push(source);
        }

        sources
    }

    fn on_worker_exit(&mut self, joined: Joined<T>) -> Result<()> {
        let id = match &joined {
            Ok((id, _)) => *id,
            Err(e) => e.id(),
        };
        let Some(tag) = self.tags.remove(&id) else {
            warn!("joined a task that isn't a worker");
            return Ok(());
        };

        // A worker sends everything before returning, print it ahead of its exit.
        self.drain_ready();

        let err = match joined {
            Ok((_, Ok(result))) => {
                let snapshot = ProgressSnapshot::take(SourceId::COORDINATOR, &self.buffers);
                self.log(format!("thread finished; {snapshot}"));
                debug!(source = tag.source.0, writes = result.writes; "worker exited");
                self.results.push(result);
                return Ok(());
            }
            Ok((_, Err(e))) => HarnessError::WorkerFault {
                worker: tag.source,
                wave: tag.wave,
                code: e.exit_code(),
                reason: e.to_string(),
            },
            Err(e) => HarnessError::WorkerPanicked {
                worker: tag.source,
                wave: tag.wave,
                message: panic_message(e),
            },
        };

        let faulted = WorkerResult::faulted(
            tag.source,
            err.exit_code(),
            tag.started.elapsed(),
            self.buffers.snapshot(),
        );
        self.report_fault(&tag, &faulted, &err);

        Err(err)
    }

    fn report_fault(&mut self, tag: &WorkerTag, faulted: &WorkerResult<T>, err: &HarnessError) {
        error!(
            source = tag.source.0,
            index = tag.index,
            code = faulted.exit_code;
            "{err}"
        );

        let (a, b) = &faulted.final_state;
        self.log(format!(
            "worker {} stopped with exit code {} after {}ms; arr1:{} | arr2:{}",
            faulted.source,
            faulted.exit_code,
            faulted.elapsed.as_millis(),
            crate::reporting::render(a),
            crate::reporting::render(b),
        ));
    }

    fn drain_ready(&mut self) {
        while let Some(Some(msg)) = self.hub.next().now_or_never() {
            self.emit(msg.into_record());
        }
    }

    fn stop_reporting(&mut self) {
        if let Some(reporter) = self.reporter.take() {
            reporter.cancel();
            debug!("progress reporter cancelled");
        }
    }

    fn log(&mut self, text: impl Into<String>) {
        self.emit(LogRecord::new(SourceId::COORDINATOR, text));
    }

    /// Output failures never end the run.
    fn emit(&mut self, record: LogRecord) {
        if let Err(e) = writeln!(self.out, "{}", record.line(self.pid)) {
            warn!(source = record.source.0; "failed to write output line: {e}");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!("failed to flush output: {e}");
        }
    }
}

fn panic_message(e: JoinError) -> String {
    match e.try_into_panic() {
        Ok(payload) => payload_message(payload.as_ref()),
        Err(e) => e.to_string(),
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        format!("worker panicked (exit code {PANIC_EXIT_CODE})")
    }
}
