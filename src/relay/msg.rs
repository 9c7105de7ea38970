use super::{LogRecord, SourceId};
use crate::{
    reporting::{FinalState, ProgressSnapshot},
    storage::Element,
};

/// Everything a worker can relay to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<T: Element> {
    /// A free-form line of text.
    Log(LogRecord),
    /// A periodic view of both buffers.
    Progress(ProgressSnapshot<T>),
    /// The buffers as seen by a worker once its loop completed.
    Final(FinalState<T>),
}

impl<T: Element> Msg<T> {
    pub fn source(&self) -> SourceId {
        match self {
            Msg::Log(record) => record.source,
            Msg::Progress(snapshot) => snapshot.source,
            Msg::Final(state) => state.source,
        }
    }

    /// Turns the message into the record the coordinator prints, verbatim.
    pub fn into_record(self) -> LogRecord {
        match self {
            Msg::Log(record) => record,
            Msg::Progress(snapshot) => LogRecord {
                timestamp: snapshot.timestamp,
                source: snapshot.source,
                text: snapshot.to_string(),
            },
            Msg::Final(state) => LogRecord {
                timestamp: state.timestamp,
                source: state.source,
                text: state.to_string(),
            },
        }
    }
}

impl<T: Element> From<LogRecord> for Msg<T> {
    fn from(record: LogRecord) -> Self {
        Msg::Log(record)
    }
}
