use std::fmt;

use rayon::prelude::*;

use super::{Element, OutOfBoundsErr, Result};

/// How a write lands on a shared element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// A plain store with no indivisibility guarantee.
    Direct,
    /// An indivisible exchange.
    Atomic,
}

impl WriteMode {
    /// Picks the write discipline from a `use_atomic_writes` flag.
    pub fn from_atomic(use_atomic_writes: bool) -> Self {
        if use_atomic_writes {
            Self::Atomic
        } else {
            Self::Direct
        }
    }

    pub fn is_atomic(self) -> bool {
        self == Self::Atomic
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct-access"),
            Self::Atomic => f.write_str("Atomic"),
        }
    }
}

/// A fixed-length buffer of unsigned integers shared by every participant of a run.
///
/// It embraces race conditions: nothing coordinates element access besides what the chosen
/// `WriteMode` provides for a single element. The length never changes after allocation.
pub struct SharedBuffer<T: Element> {
    cells: Box<[T::Cell]>,
}

impl<T: Element> SharedBuffer<T> {
    /// Creates a new `SharedBuffer` filled with zeroes.
    ///
    /// # Arguments
    /// * `len` - The amount of elements, fixed for the buffer's whole life.
    ///
    /// # Returns
    /// A new `SharedBuffer` instance.
    pub fn zeroed(len: usize) -> Self {
        let zero = T::from_u64_wrapping(0);

        Self {
            cells: (0..len).map(|_| T::new_cell(zero)).collect(),
        }
    }

    /// Creates a new `SharedBuffer` holding the range `1..=len`.
    ///
    /// # Arguments
    /// * `len` - The amount of elements, fixed for the buffer's whole life.
    ///
    /// # Returns
    /// A new `SharedBuffer` instance.
    pub fn with_range(len: usize) -> Self {
        let buf = Self::zeroed(len);
        buf.fill_with_range();
        buf
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Overwrites every element `i` with `i + 1`.
    pub fn fill_with_range(&self) {
        self.cells.par_iter().enumerate().for_each(|(i, cell)| {
            T::store_direct(cell, T::from_u64_wrapping(i as u64 + 1));
        });
    }

    /// Doubles every element in place.
    ///
    /// Each element is read and written back directly, so concurrent writers may lose their
    /// update or have it doubled.
    pub fn double_in_place(&self) {
        self.cells.par_iter().for_each(|cell| {
            let value = T::load_direct(cell);
            T::store_direct(cell, value.doubled());
        });
    }

    /// Writes `value` at `index` using the given discipline.
    ///
    /// # Arguments
    /// * `index` - The position to write to.
    /// * `value` - The new value of the element.
    /// * `mode` - Whether to exchange atomically or store directly.
    ///
    /// # Returns
    /// An `OutOfBoundsErr` if `index` is past the end of the buffer.
    pub fn write(&self, index: usize, value: T, mode: WriteMode) -> Result<()> {
        let cell = self.cell(index)?;

        match mode {
            WriteMode::Atomic => {
                T::exchange(cell, value);
            }
            WriteMode::Direct => T::store_direct(cell, value),
        }

        Ok(())
    }

    /// Reads the element at `index` as a single indivisible step.
    ///
    /// # Returns
    /// An `OutOfBoundsErr` if `index` is past the end of the buffer.
    pub fn load(&self, index: usize) -> Result<T> {
        self.cell(index).map(T::load)
    }

    /// Copies the current contents without any coordination against writers.
    ///
    /// # Returns
    /// A vector of exactly `self.len()` values, any of which may be stale or torn.
    pub fn snapshot(&self) -> Vec<T> {
        self.cells.iter().map(T::load_direct).collect()
    }

    /// Copies the current contents reading each element atomically.
    pub fn snapshot_atomic(&self) -> Vec<T> {
        self.cells.iter().map(T::load).collect()
    }

    fn cell(&self, index: usize) -> Result<&T::Cell> {
        self.cells.get(index).ok_or(OutOfBoundsErr {
            index,
            len: self.len(),
        })
    }
}

impl<T: Element> fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.snapshot()).finish()
    }
}
