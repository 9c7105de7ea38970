use std::num::NonZeroU64;

/// The largest integer a double can represent exactly, `2^53 - 1`.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Scales `MAX_SAFE_INTEGER` down to a loop that finishes in seconds.
const SHRINK_LOOP_SIZE_BY: u64 = 10_000_000;

pub const DEFAULT_ITERATIONS: u64 = MAX_SAFE_INTEGER / SHRINK_LOOP_SIZE_BY;
pub const DEFAULT_PROGRESS_EVERY: u64 = 200_000_000_000;
pub const DEFAULT_WRITE_EVERY: u64 = 300_000;

/// Bounds of a worker's stress loop.
///
/// The loop counts `i` from `1` to `iterations` inclusive, relays a snapshot whenever `i` is a
/// multiple of `progress_every` and writes into a buffer whenever `i` is a multiple of
/// `write_every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSchedule {
    pub iterations: u64,
    pub progress_every: NonZeroU64,
    pub write_every: NonZeroU64,
}

impl LoopSchedule {
    /// Creates a new `LoopSchedule`.
    ///
    /// # Arguments
    /// * `iterations` - The last value of the loop counter.
    /// * `progress_every` - Period, in iterations, of the relayed snapshots.
    /// * `write_every` - Period, in iterations, of the buffer writes.
    ///
    /// # Returns
    /// A new `LoopSchedule` instance.
    pub fn new(iterations: u64, progress_every: NonZeroU64, write_every: NonZeroU64) -> Self {
        Self {
            iterations,
            progress_every,
            write_every,
        }
    }

    /// The amount of writes a worker following this schedule attempts.
    pub fn writes(&self) -> u64 {
        self.iterations / self.write_every.get()
    }

    /// The amount of snapshots a worker following this schedule relays from its loop.
    pub fn snapshots(&self) -> u64 {
        self.iterations / self.progress_every.get()
    }
}

impl Default for LoopSchedule {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            progress_every: NonZeroU64::new(DEFAULT_PROGRESS_EVERY).unwrap_or(NonZeroU64::MAX),
            write_every: NonZeroU64::new(DEFAULT_WRITE_EVERY).unwrap_or(NonZeroU64::MIN),
        }
    }
}
