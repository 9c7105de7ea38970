use futures::stream::{SelectAll, StreamExt};

use super::RelayReceiver;

/// Merges the receiving ends of every relay into a single stream.
///
/// Messages from a single relay keep their order, there is no order across relays.
pub struct RelayHub<M> {
    streams: SelectAll<RelayReceiver<M>>,
}

impl<M> Default for RelayHub<M> {
    fn default() -> Self {
        Self {
            streams: SelectAll::new(),
        }
    }
}

impl<M> RelayHub<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening on `rx`.
    pub fn attach(&mut self, rx: RelayReceiver<M>) {
        self.streams.push(rx);
    }

    /// Waits for the next message from any attached relay.
    ///
    /// # Returns
    /// `None` once every attached relay has been closed by all of its senders and drained.
    pub async fn next(&mut self) -> Option<M> {
        self.streams.next().await
    }

    /// The amount of relays that can still deliver messages.
    pub fn open(&self) -> usize {
        self.streams.len()
    }
}
