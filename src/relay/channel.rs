use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use log::debug;

use super::{LogRecord, SourceId};

/// The receiving end of a relay, a `Stream` of messages in the order they were sent.
pub type RelayReceiver<M> = UnboundedReceiver<M>;

/// The sending end of a relay, owned by exactly one source.
///
/// Sending never blocks. Once the receiving end is gone messages are silently dropped, a
/// source is never failed because nobody is listening anymore.
#[derive(Debug)]
pub struct RelaySender<M> {
    source: SourceId,
    tx: UnboundedSender<M>,
}

impl<M> Clone for RelaySender<M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            tx: self.tx.clone(),
        }
    }
}

impl<M> RelaySender<M> {
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Queues `msg` for the receiving end.
    ///
    /// # Returns
    /// Whether the message was queued, `false` if the receiving end was dropped.
    pub fn send(&self, msg: M) -> bool {
        let sent = self.tx.unbounded_send(msg).is_ok();
        if !sent {
            debug!(source = self.source.0; "relay closed, dropping message");
        }

        sent
    }
}

impl<M: From<LogRecord>> RelaySender<M> {
    /// Stamps `text` with the current time and this sender's source and queues it.
    pub fn log(&self, text: impl Into<String>) -> bool {
        self.send(LogRecord::new(self.source, text).into())
    }
}

/// Creates both ends of a one-directional relay for `source`.
///
/// # Arguments
/// * `source` - Who will be sending through this relay.
///
/// # Returns
/// The sending and receiving ends.
pub fn channel<M>(source: SourceId) -> (RelaySender<M>, RelayReceiver<M>) {
    let (tx, rx) = mpsc::unbounded();
    (RelaySender { source, tx }, rx)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn delivery_is_fifo_per_sender() {
        let (tx, mut rx) = channel::<LogRecord>(SourceId(1));

        for i in 0..100 {
            assert!(tx.log(format!("line {i}")));
        }
        drop(tx);

        let texts: Vec<_> = rx.by_ref().map(|record| record.text).collect().await;
        let expected: Vec<_> = (0..100).map(|i| format!("line {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn sending_after_the_receiver_is_gone_is_not_an_error() {
        let (tx, rx) = channel::<LogRecord>(SourceId(2));
        drop(rx);

        assert!(!tx.log("nobody listens"));
        assert_eq!(tx.source(), SourceId(2));
    }
}
