//! Shows a repeating task starved by a blocking loop on its own thread, then left alone while
//! the same loop runs on a worker thread.

use std::{
    process,
    time::{Duration, Instant},
};

use anyhow::Context;
use futures::StreamExt;
use log::{debug, info};
use tokio::{runtime::Builder, task};

use shmem_stress::{
    relay::{self, LogRecord, SourceId},
    reporting::RepeatingTask,
};

const TICK: Duration = Duration::from_secs(1);
const LOOP_TIME: Duration = Duration::from_secs(5);
const LOG_EVERY: u64 = 10_000_000;

const WORKER: SourceId = SourceId(1);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // A single thread, the ticker only runs when the main loop lets it.
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    runtime.block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let pid = process::id();

    let mut ticks = 0;
    let ticker = RepeatingTask::spawn(TICK, move || {
        ticks += 1;
        print(pid, LogRecord::new(SourceId::COORDINATOR, format!("timeout log: {ticks}")));
    });
    task::yield_now().await;

    let n = busy_loop("first while", |text| {
        print(pid, LogRecord::new(SourceId::COORDINATOR, text));
    });
    debug!(iterations = n; "main loop done");

    let (tx, mut rx) = relay::channel::<LogRecord>(WORKER);
    let worker = task::spawn_blocking(move || {
        busy_loop("second while", |text| {
            tx.log(text);
        })
    });

    while let Some(record) = rx.next().await {
        print(pid, record);
    }

    let ret = worker.await;
    ticker.stop().await;

    let n = ret.with_context(|| format!("worker {WORKER} stopped abnormally"))?;
    info!(iterations = n; "worker loop done");

    Ok(())
}

/// Spins for `LOOP_TIME`, handing `log` a line every `LOG_EVERY` iterations.
///
/// # Returns
/// The amount of iterations run.
fn busy_loop(label: &str, mut log: impl FnMut(String)) -> u64 {
    let stop = Instant::now() + LOOP_TIME;
    let mut n: u64 = 0;

    while Instant::now() < stop {
        n += 1;
        if n % LOG_EVERY == 0 {
            log(format!("{label}: {n}"));
        }
    }

    n
}

fn print(pid: u32, record: LogRecord) {
    println!("{}", record.line(pid));
}
