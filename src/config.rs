use std::{
    fmt,
    num::{NonZeroUsize, ParseIntError},
    time::Duration,
};

use log::warn;

use crate::{
    storage::WriteMode,
    worker::{Fault, LoopSchedule},
};

pub const DEFAULT_ELEMENT_COUNT: NonZeroUsize = NonZeroUsize::MIN.saturating_add(19);
pub const DEFAULT_WORKER_COUNT: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1);
pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(3);

/// The environment variable capping the amount of workers per wave.
pub const MAX_WORKERS_VAR: &str = "SHMEM_MAX_WORKERS";

/// The environment variable picking the buffers' element type.
pub const ELEMENT_VAR: &str = "SHMEM_ELEMENT";

/// The element types a run can be made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    U8,
    U16,
    #[default]
    U32,
    U64,
    U128,
    /// A `u32` stored one byte at a time, see `BytewiseU32`.
    BytewiseU32,
}

impl ElementKind {
    /// Reads the element type from its raw environment value, unknown names fall back to `u32`.
    pub fn from_env(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "bytewise" | "bytewise-u32" => Self::BytewiseU32,
            _ => {
                warn!(value = raw; "ignoring unknown {ELEMENT_VAR}");
                Self::default()
            }
        }
    }
}

/// One of the two batches of workers started during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wave {
    /// Started immediately, writes with direct stores.
    First,
    /// Started after the wave delay, writes with atomic exchanges.
    Second,
}

impl Wave {
    pub fn mode(self) -> WriteMode {
        match self {
            Wave::First => WriteMode::Direct,
            Wave::Second => WriteMode::Atomic,
        }
    }
}

impl fmt::Display for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wave::First => write!(f, "first"),
            Wave::Second => write!(f, "second"),
        }
    }
}

/// A fault to inject into a single worker of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedFault {
    pub wave: Wave,
    pub worker_index: usize,
    pub fault: Fault,
}

impl InjectedFault {
    /// The fault the worker at `worker_index` of `wave` has to raise, if any.
    pub fn for_worker(&self, wave: Wave, worker_index: usize) -> Option<Fault> {
        (self.wave == wave && self.worker_index == worker_index).then_some(self.fault)
    }
}

/// The whole setup of a harness run.
///
/// | field | default |
/// |---|---|
/// | `element_count` | 20 |
/// | `worker_count` | 2, capped by `max_workers` |
/// | `max_workers` | none |
/// | `wave_delay` | 1s |
/// | `report_interval` | 3s |
/// | `worker_report_interval` | 3s |
/// | `schedule` | `LoopSchedule::default()` |
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub element_count: NonZeroUsize,
    pub worker_count: NonZeroUsize,
    pub max_workers: Option<NonZeroUsize>,
    pub wave_delay: Duration,
    pub report_interval: Duration,
    pub worker_report_interval: Option<Duration>,
    pub schedule: LoopSchedule,
    pub fault: Option<InjectedFault>,
    pub record_writes: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            element_count: DEFAULT_ELEMENT_COUNT,
            worker_count: DEFAULT_WORKER_COUNT,
            max_workers: None,
            wave_delay: DEFAULT_WAVE_DELAY,
            report_interval: DEFAULT_REPORT_INTERVAL,
            worker_report_interval: Some(DEFAULT_REPORT_INTERVAL),
            schedule: LoopSchedule::default(),
            fault: None,
            record_writes: false,
        }
    }
}

impl HarnessConfig {
    /// Builds the configuration from the positional arguments, the program name excluded.
    ///
    /// The first argument is the element count and the second one the worker count. Each one is
    /// read from its leading digits, anything missing, unreadable or zero falls back to the
    /// default.
    ///
    /// # Arguments
    /// * `args` - The positional arguments.
    /// * `max_workers` - An optional cap on the worker count.
    ///
    /// # Returns
    /// The run configuration, never an error.
    pub fn from_args<I, S>(args: I, max_workers: Option<NonZeroUsize>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter().map(|arg| arg.as_ref().to_owned());
        let element_count = count_or_default(
            args.next().as_deref(),
            "element count",
            DEFAULT_ELEMENT_COUNT,
        );
        let worker_count = count_or_default(
            args.next().as_deref(),
            "worker count",
            DEFAULT_WORKER_COUNT,
        );

        Self::default()
            .with_element_count(element_count)
            .with_max_workers(max_workers)
            .with_worker_count(worker_count)
    }

    /// Reads the worker cap from its raw environment value, ignoring it if unreadable.
    pub fn max_workers_from_env(raw: Option<&str>) -> Option<NonZeroUsize> {
        let raw = raw?;
        match leading_count(raw) {
            Ok(Some(max)) => Some(max),
            _ => {
                warn!(value = raw; "ignoring invalid {MAX_WORKERS_VAR}");
                None
            }
        }
    }

    pub fn with_element_count(mut self, element_count: NonZeroUsize) -> Self {
        self.element_count = element_count;
        self
    }

    /// Sets the worker count, capped by the current `max_workers`.
    pub fn with_worker_count(mut self, worker_count: NonZeroUsize) -> Self {
        self.worker_count = self.capped(worker_count);
        self
    }

    /// Sets the worker cap, lowering the current worker count if needed.
    pub fn with_max_workers(mut self, max_workers: Option<NonZeroUsize>) -> Self {
        self.max_workers = max_workers;
        self.worker_count = self.capped(self.worker_count);
        self
    }

    pub fn with_wave_delay(mut self, wave_delay: Duration) -> Self {
        self.wave_delay = wave_delay;
        self
    }

    pub fn with_report_interval(mut self, report_interval: Duration) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Sets the period of every worker's own reporter, `None` disables them.
    pub fn with_worker_report_interval(mut self, interval: Option<Duration>) -> Self {
        self.worker_report_interval = interval;
        self
    }

    pub fn with_schedule(mut self, schedule: LoopSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_fault(mut self, fault: Option<InjectedFault>) -> Self {
        self.fault = fault;
        self
    }

    pub fn recording_writes(mut self, record_writes: bool) -> Self {
        self.record_writes = record_writes;
        self
    }

    fn capped(&self, worker_count: NonZeroUsize) -> NonZeroUsize {
        match self.max_workers {
            Some(max) if worker_count > max => {
                warn!(requested = worker_count.get(), max = max.get(); "capping worker count");
                max
            }
            _ => worker_count,
        }
    }
}

fn count_or_default(raw: Option<&str>, what: &str, default: NonZeroUsize) -> NonZeroUsize {
    let Some(raw) = raw else {
        return default;
    };

    match leading_count(raw) {
        Ok(Some(count)) => count,
        Ok(None) => {
            warn!(value = raw, default = default.get(); "{what} is zero, using the default");
            default
        }
        Err(e) => {
            warn!(value = raw, default = default.get(); "invalid {what} ({e}), using the default");
            default
        }
    }
}

/// Parses the run of digits `raw` starts with, after any leading whitespace and an optional `+`.
fn leading_count(raw: &str) -> Result<Option<NonZeroUsize>, ParseIntError> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    unsigned[..end].parse::<usize>().map(NonZeroUsize::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::FaultKind;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn missing_args_use_the_defaults() {
        let config = HarnessConfig::from_args(Vec::<String>::new(), None);

        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.element_count.get(), 20);
        assert_eq!(config.worker_count.get(), 2);
        assert_eq!(config.wave_delay, Duration::from_secs(1));
        assert_eq!(config.report_interval, Duration::from_secs(3));
    }

    #[test]
    fn numeric_args_are_taken() {
        let config = HarnessConfig::from_args(["5", "4"], None);

        assert_eq!(config.element_count.get(), 5);
        assert_eq!(config.worker_count.get(), 4);
    }

    #[test]
    fn invalid_or_zero_args_fall_back() {
        for (args, element_count, worker_count) in [
            (["abc", "0"], 20, 2),
            (["0", "x7"], 20, 2),
            (["-3", ""], 20, 2),
            (["12abc", " +3"], 12, 3),
            (["7.9", "3e2"], 7, 3),
        ] {
            let config = HarnessConfig::from_args(args, None);

            assert_eq!(config.element_count.get(), element_count, "{args:?}");
            assert_eq!(config.worker_count.get(), worker_count, "{args:?}");
        }
    }

    #[test]
    fn worker_count_is_capped() {
        let config = HarnessConfig::from_args(["5", "64"], Some(nz(8)));
        assert_eq!(config.worker_count.get(), 8);

        let config = HarnessConfig::default()
            .with_worker_count(nz(6))
            .with_max_workers(Some(nz(3)));
        assert_eq!(config.worker_count.get(), 3);

        let config = HarnessConfig::from_args(["5", "2"], Some(nz(8)));
        assert_eq!(config.worker_count.get(), 2);
    }

    #[test]
    fn max_workers_env_value() {
        assert_eq!(HarnessConfig::max_workers_from_env(None), None);
        assert_eq!(HarnessConfig::max_workers_from_env(Some("4")), Some(nz(4)));
        assert_eq!(HarnessConfig::max_workers_from_env(Some("0")), None);
        assert_eq!(HarnessConfig::max_workers_from_env(Some("many")), None);
    }

    #[test]
    fn element_kind_env_value() {
        assert_eq!(ElementKind::from_env(None), ElementKind::U32);
        assert_eq!(ElementKind::from_env(Some("u128")), ElementKind::U128);
        assert_eq!(ElementKind::from_env(Some(" Bytewise ")), ElementKind::BytewiseU32);
        assert_eq!(ElementKind::from_env(Some("f64")), ElementKind::U32);
    }

    #[test]
    fn waves_and_faults() {
        assert_eq!(Wave::First.mode(), WriteMode::Direct);
        assert_eq!(Wave::Second.mode(), WriteMode::Atomic);

        let injected = InjectedFault {
            wave: Wave::Second,
            worker_index: 1,
            fault: Fault {
                iteration: 10,
                kind: FaultKind::Error,
            },
        };

        assert_eq!(injected.for_worker(Wave::Second, 1), Some(injected.fault));
        assert_eq!(injected.for_worker(Wave::First, 1), None);
        assert_eq!(injected.for_worker(Wave::Second, 0), None);
    }
}
