use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    relay::SourceId,
    storage::{BufferPair, Element},
};

/// Joins `values` with commas, the way every buffer is rendered in the output.
pub fn render<T: Element>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// An uncoordinated, point-in-time read of both buffers.
///
/// Values may be stale or, for wide elements written directly, torn. The length of each side
/// is always the length of the buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot<T: Element> {
    pub timestamp: DateTime<Utc>,
    pub source: SourceId,
    pub buffer_a: Vec<T>,
    pub buffer_b: Vec<T>,
}

impl<T: Element> ProgressSnapshot<T> {
    /// Reads both buffers without coordinating with concurrent writers.
    ///
    /// # Arguments
    /// * `source` - Who is taking the snapshot.
    /// * `buffers` - The buffers to read.
    pub fn take(source: SourceId, buffers: &BufferPair<T>) -> Self {
        let (buffer_a, buffer_b) = buffers.snapshot();

        Self {
            timestamp: Utc::now(),
            source,
            buffer_a,
            buffer_b,
        }
    }
}

impl<T: Element> fmt::Display for ProgressSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arr1:{} | arr2:{}",
            render(&self.buffer_a),
            render(&self.buffer_b)
        )
    }
}

/// The buffers as a worker saw them once its loop completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalState<T: Element> {
    pub timestamp: DateTime<Utc>,
    pub source: SourceId,
    pub buffer_a: Vec<T>,
    pub buffer_b: Vec<T>,
    pub elapsed: Duration,
}

impl<T: Element> fmt::Display for FinalState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arr1: {}\narr2: {}",
            render(&self.buffer_a),
            render(&self.buffer_b)
        )
    }
}
