#![allow(dead_code)]

use std::{io, num::NonZeroU64, num::NonZeroUsize, sync::Arc, time::Duration};

use chrono::DateTime;
use parking_lot::Mutex;
use shmem_stress::{HarnessConfig, worker::LoopSchedule};

/// An output sink that can still be read after the coordinator consumed it.
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn schedule(iterations: u64, progress_every: u64, write_every: u64) -> LoopSchedule {
    LoopSchedule::new(
        iterations,
        NonZeroU64::new(progress_every).unwrap(),
        NonZeroU64::new(write_every).unwrap(),
    )
}

/// A run that finishes in well under a second.
pub fn quick_config(elements: usize, workers: usize) -> HarnessConfig {
    HarnessConfig::default()
        .with_element_count(NonZeroUsize::new(elements).unwrap())
        .with_worker_count(NonZeroUsize::new(workers).unwrap())
        .with_wave_delay(Duration::from_millis(50))
        .with_report_interval(Duration::from_millis(20))
        .with_worker_report_interval(Some(Duration::from_millis(20)))
        .with_schedule(schedule(300_000, 50_000, 1_000))
}

/// A parsed `[<timestamp>] (<pid>-<source>) <text>` line.
#[derive(Debug)]
pub struct Line<'a> {
    pub pid: u32,
    pub source: usize,
    pub text: &'a str,
}

/// Parses a single output line, panicking if it doesn't have the expected shape.
pub fn parse_line(line: &str) -> Line<'_> {
    let rest = line.strip_prefix('[').unwrap_or_else(|| panic!("no timestamp: {line:?}"));
    let (timestamp, rest) = rest.split_once("] (").unwrap();
    assert!(timestamp.ends_with('Z'), "{timestamp}");
    assert_eq!(timestamp.len(), "2020-05-21T23:41:52.350Z".len(), "{timestamp}");
    DateTime::parse_from_rfc3339(timestamp).unwrap();

    let (tag, text) = rest.split_once(") ").unwrap();
    let (pid, source) = tag.split_once('-').unwrap();

    Line {
        pid: pid.parse().unwrap(),
        source: source.parse().unwrap(),
        text,
    }
}

/// Parses every line of `output`, the second line of a final state is folded into the first.
pub fn parse_output(output: &str) -> Vec<Line<'_>> {
    output
        .lines()
        .filter(|line| !line.starts_with("arr2: "))
        .map(parse_line)
        .collect()
}

/// Parses `arr1:1,2,3 | arr2:4,5,6` into both buffers.
pub fn parse_snapshot(text: &str) -> (Vec<u64>, Vec<u64>) {
    let (a, b) = text.split_once(" | ").unwrap();
    let values = |raw: &str| -> Vec<u64> {
        raw.split(',').map(|v| v.parse().unwrap()).collect()
    };

    (
        values(a.strip_prefix("arr1:").unwrap()),
        values(b.strip_prefix("arr2:").unwrap()),
    )
}
