mod buffer;
mod element;
mod error;
mod pair;

pub use buffer::{SharedBuffer, WriteMode};
pub use element::{BytewiseU32, Element, Part, SplitCell, WideCell};
pub use error::{OutOfBoundsErr, Result};
pub use pair::{BufferId, BufferPair};
