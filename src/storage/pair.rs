use std::{fmt, sync::Arc};

use super::{Element, SharedBuffer};

/// Identifies one of the two buffers of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferId {
    A,
    B,
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("arr1"),
            Self::B => f.write_str("arr2"),
        }
    }
}

/// The two shared buffers of a run, `A` and `B`, always of the same length.
///
/// Cloning only clones the handles, every clone refers to the same memory.
pub struct BufferPair<T: Element> {
    a: Arc<SharedBuffer<T>>,
    b: Arc<SharedBuffer<T>>,
}

impl<T: Element> Clone for BufferPair<T> {
    fn clone(&self) -> Self {
        Self {
            a: Arc::clone(&self.a),
            b: Arc::clone(&self.b),
        }
    }
}

impl<T: Element> BufferPair<T> {
    /// Allocates both buffers and fills each one with the range `1..=len`.
    ///
    /// # Arguments
    /// * `len` - The amount of elements per buffer.
    ///
    /// # Returns
    /// A new `BufferPair` instance.
    pub fn initialize(len: usize) -> Self {
        Self {
            a: Arc::new(SharedBuffer::with_range(len)),
            b: Arc::new(SharedBuffer::with_range(len)),
        }
    }

    /// The amount of elements in each buffer.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn get(&self, id: BufferId) -> &SharedBuffer<T> {
        match id {
            BufferId::A => &self.a,
            BufferId::B => &self.b,
        }
    }

    pub fn a(&self) -> &SharedBuffer<T> {
        &self.a
    }

    pub fn b(&self) -> &SharedBuffer<T> {
        &self.b
    }

    /// Chooses the buffer a write at `index` goes to.
    ///
    /// Indices past the middle of the buffer land in `A`, the rest in `B`.
    pub fn target_for(&self, index: usize) -> BufferId {
        if index > self.len() / 2 {
            BufferId::A
        } else {
            BufferId::B
        }
    }

    /// Uncoordinated copy of both buffers, in `(A, B)` order.
    pub fn snapshot(&self) -> (Vec<T>, Vec<T>) {
        (self.a.snapshot(), self.b.snapshot())
    }

    /// Copy of both buffers reading each element atomically, in `(A, B)` order.
    pub fn snapshot_atomic(&self) -> (Vec<T>, Vec<T>) {
        (self.a.snapshot_atomic(), self.b.snapshot_atomic())
    }
}
