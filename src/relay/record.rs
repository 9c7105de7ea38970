use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// Identifies who produced a line of output: the coordinator is always `0`, workers count up
/// from `1` in spawn order across both waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub usize);

impl SourceId {
    pub const COORDINATOR: Self = Self(0);
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single line of harness output, stamped at the moment it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub source: SourceId,
    pub text: String,
}

impl LogRecord {
    pub fn new(source: SourceId, text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source,
            text: text.into(),
        }
    }

    /// Renders the record as `[<timestamp>] (<pid>-<source>) <text>`.
    ///
    /// # Arguments
    /// * `pid` - The id of the process the record is printed from.
    pub fn line(&self, pid: u32) -> String {
        format!(
            "[{}] ({pid}-{}) {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.source,
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn line_shape() {
        let record = LogRecord {
            timestamp: Utc.with_ymd_and_hms(2020, 3, 26, 11, 3, 16).unwrap(),
            source: SourceId(3),
            text: "new thread executing".into(),
        };

        assert_eq!(
            record.line(12362),
            "[2020-03-26T11:03:16.000Z] (12362-3) new thread executing"
        );
    }

    #[test]
    fn coordinator_is_source_zero() {
        let record = LogRecord::new(SourceId::COORDINATOR, "main thread/process started");
        assert!(record.line(1).contains("(1-0) main thread/process started"));
    }
}
