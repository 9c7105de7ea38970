mod channel;
mod hub;
mod msg;
mod record;

pub use channel::{RelayReceiver, RelaySender, channel};
pub use hub::RelayHub;
pub use msg::Msg;
pub use record::{LogRecord, SourceId};
