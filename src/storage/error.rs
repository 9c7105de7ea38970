use std::{
    error::Error,
    fmt::{self, Display},
};

/// The specific result type for element accesses inside the storage module.
pub type Result<T> = std::result::Result<T, OutOfBoundsErr>;

/// Error returned by `SharedBuffer` whenever an access targets an index past its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBoundsErr {
    pub index: usize,
    pub len: usize,
}

impl Display for OutOfBoundsErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SharedBuffer error: index {} out of bounds for length {}",
            self.index, self.len
        )
    }
}

impl Error for OutOfBoundsErr {}
