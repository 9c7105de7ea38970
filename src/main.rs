use std::{
    env,
    io::{self, Write},
    process::ExitCode,
};

use anyhow::Context;
use tokio::runtime::Runtime;

use shmem_stress::{
    Coordinator, HarnessConfig,
    config::{ELEMENT_VAR, ElementKind, MAX_WORKERS_VAR},
    storage::{BytewiseU32, Element},
};

fn main() -> ExitCode {
    env_logger::init();

    report(run(), &mut io::stderr())
}

fn run() -> anyhow::Result<()> {
    let max_workers = HarnessConfig::max_workers_from_env(env::var(MAX_WORKERS_VAR).ok().as_deref());
    let config = HarnessConfig::from_args(env::args().skip(1), max_workers);

    match ElementKind::from_env(env::var(ELEMENT_VAR).ok().as_deref()) {
        ElementKind::U8 => run_with::<u8>(config),
        ElementKind::U16 => run_with::<u16>(config),
        ElementKind::U32 => run_with::<u32>(config),
        ElementKind::U64 => run_with::<u64>(config),
        ElementKind::U128 => run_with::<u128>(config),
        ElementKind::BytewiseU32 => run_with::<BytewiseU32>(config),
    }
}

fn run_with<T: Element>(config: HarnessConfig) -> anyhow::Result<()> {
    let runtime = Runtime::new().context("failed to start the tokio runtime")?;
    let ret = runtime.block_on(Coordinator::<T, _>::new(config, io::stdout()).run());

    // Workers still running after a fault can't be interrupted, leave them behind.
    runtime.shutdown_background();

    ret.context("harness run failed")?;
    Ok(())
}

/// Turns the outcome of a run into the process exit code, writing a failure to `err` once.
fn report<W: Write>(ret: anyhow::Result<()>, err: &mut W) -> ExitCode {
    match ret {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(err, "Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
