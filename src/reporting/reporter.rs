use std::time::Duration;

use log::trace;
use tokio_util::sync::DropGuard;

use super::{ProgressSnapshot, RepeatingTask};
use crate::{
    relay::{Msg, RelaySender},
    storage::{BufferPair, Element},
};

/// Periodically relays an uncoordinated snapshot of both buffers.
///
/// The coordinator and every worker own their own reporter, each one cancelled by its owner.
#[derive(Debug)]
pub struct ProgressReporter {
    task: RepeatingTask,
}

impl ProgressReporter {
    /// Starts reporting on the current tokio runtime.
    ///
    /// # Arguments
    /// * `period` - The time between two consecutive snapshots.
    /// * `buffers` - The buffers to read.
    /// * `relay` - Where to send the snapshots, stamped with the relay's source.
    pub fn spawn<T: Element>(
        period: Duration,
        buffers: BufferPair<T>,
        relay: RelaySender<Msg<T>>,
    ) -> Self {
        let task = RepeatingTask::spawn(period, move || {
            let snapshot = ProgressSnapshot::take(relay.source(), &buffers);
            trace!(source = relay.source().0; "progress snapshot taken");
            relay.send(Msg::Progress(snapshot));
        });

        Self { task }
    }

    pub fn cancel(&self) {
        self.task.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_cancelled()
    }

    /// A guard that cancels the reporter when dropped, even while unwinding.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.task.cancel_on_drop()
    }

    /// Cancels the reporter and waits until it released its relay.
    pub async fn stop(self) {
        self.task.stop().await;
    }
}
