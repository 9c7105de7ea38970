use std::{
    fmt,
    sync::atomic::{AtomicU8, AtomicU16, AtomicU32, AtomicU64, Ordering},
};

use parking_lot::Mutex;

/// A fixed-width unsigned integer that can be stored inside a `SharedBuffer`.
///
/// Every element lives in a `Cell` that supports two write disciplines: an indivisible
/// exchange and a direct, unsynchronized store. Reads come in the same two flavours.
pub trait Element: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The shared storage slot for a single element.
    type Cell: Send + Sync;

    /// The width of the element in bits.
    const BITS: u32;

    /// Creates a new storage slot holding `value`.
    fn new_cell(value: Self) -> Self::Cell;

    /// Replaces the value in `cell` as a single indivisible step.
    ///
    /// # Returns
    /// The value held by `cell` right before the exchange.
    fn exchange(cell: &Self::Cell, value: Self) -> Self;

    /// Reads `cell` as a single indivisible step.
    fn load(cell: &Self::Cell) -> Self;

    /// Writes `value` into `cell` without any synchronization.
    fn store_direct(cell: &Self::Cell, value: Self);

    /// Reads `cell` without any synchronization, the result may be torn.
    fn load_direct(cell: &Self::Cell) -> Self;

    /// Truncates `value` into this element's range.
    fn from_u64_wrapping(value: u64) -> Self;

    /// Multiplies by two, wrapping on overflow.
    fn doubled(self) -> Self;
}

macro_rules! native_element {
    ($($ty:ty => $atomic:ty),* $(,)?) => {$(
        impl Element for $ty {
            type Cell = $atomic;

            const BITS: u32 = <$ty>::BITS;

            fn new_cell(value: Self) -> Self::Cell {
                <$atomic>::new(value)
            }

            fn exchange(cell: &Self::Cell, value: Self) -> Self {
                cell.swap(value, Ordering::SeqCst)
            }

            fn load(cell: &Self::Cell) -> Self {
                cell.load(Ordering::SeqCst)
            }

            // Relaxed accesses carry no ordering and never combine with a neighbouring
            // access, the closest thing to a plain store that isn't a data race.
            fn store_direct(cell: &Self::Cell, value: Self) {
                cell.store(value, Ordering::Relaxed)
            }

            fn load_direct(cell: &Self::Cell) -> Self {
                cell.load(Ordering::Relaxed)
            }

            fn from_u64_wrapping(value: u64) -> Self {
                value as $ty
            }

            fn doubled(self) -> Self {
                self.wrapping_mul(2)
            }
        }
    )*};
}

native_element!(u8 => AtomicU8, u16 => AtomicU16, u32 => AtomicU32, u64 => AtomicU64);

/// A single lane of a `SplitCell`, as wide as one store the host performs.
pub trait Part: Send + Sync {
    const BITS: u32;

    fn new(value: u64) -> Self;
    fn get(&self) -> u64;
    fn set(&self, value: u64);
}

macro_rules! part {
    ($($atomic:ty => $ty:ty),* $(,)?) => {$(
        impl Part for $atomic {
            const BITS: u32 = <$ty>::BITS;

            fn new(value: u64) -> Self {
                <$atomic>::new(value as $ty)
            }

            fn get(&self) -> u64 {
                self.load(Ordering::Relaxed) as u64
            }

            fn set(&self, value: u64) {
                self.store(value as $ty, Ordering::Relaxed)
            }
        }
    )*};
}

part!(AtomicU8 => u8, AtomicU64 => u64);

/// Storage for an element wider than the stores backing it.
///
/// The value is kept as `N` parts, lowest first. Direct accesses touch each part separately so
/// a concurrent reader or writer can interleave between them. Atomic accesses serialize on a
/// per-element lock.
#[derive(Debug)]
pub struct SplitCell<P, const N: usize> {
    parts: [P; N],
    lock: Mutex<()>,
}

/// The cell of a `u128`, two 64 bit halves.
pub type WideCell = SplitCell<AtomicU64, 2>;

impl<P: Part, const N: usize> SplitCell<P, N> {
    fn new(value: u128) -> Self {
        Self {
            parts: std::array::from_fn(|k| P::new(Self::part_of(value, k))),
            lock: Mutex::new(()),
        }
    }

    fn part_of(value: u128, k: usize) -> u64 {
        let mask = u128::MAX >> (u128::BITS - P::BITS);
        ((value >> (k as u32 * P::BITS)) & mask) as u64
    }

    fn read_parts(&self) -> u128 {
        self.parts
            .iter()
            .rev()
            .fold(0, |acc, part| (acc << P::BITS) | part.get() as u128)
    }

    fn write_parts(&self, value: u128) {
        for (k, part) in self.parts.iter().enumerate() {
            part.set(Self::part_of(value, k));
        }
    }

    fn exchange(&self, value: u128) -> u128 {
        let _guard = self.lock.lock();
        let prev = self.read_parts();
        self.write_parts(value);
        prev
    }

    fn load(&self) -> u128 {
        let _guard = self.lock.lock();
        self.read_parts()
    }
}

impl Element for u128 {
    type Cell = WideCell;

    const BITS: u32 = u128::BITS;

    fn new_cell(value: Self) -> Self::Cell {
        WideCell::new(value)
    }

    fn exchange(cell: &Self::Cell, value: Self) -> Self {
        cell.exchange(value)
    }

    fn load(cell: &Self::Cell) -> Self {
        cell.load()
    }

    fn store_direct(cell: &Self::Cell, value: Self) {
        cell.write_parts(value);
    }

    fn load_direct(cell: &Self::Cell) -> Self {
        cell.read_parts()
    }

    fn from_u64_wrapping(value: u64) -> Self {
        value as u128
    }

    fn doubled(self) -> Self {
        self.wrapping_mul(2)
    }
}

/// A 32 bit element whose direct stores go out one byte at a time.
///
/// It stands in for a host that can't store a whole element at once. Worker values cross byte
/// boundaries all the time, so two direct writers racing on an element leave values neither of
/// them wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BytewiseU32(pub u32);

impl fmt::Display for BytewiseU32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Element for BytewiseU32 {
    type Cell = SplitCell<AtomicU8, 4>;

    const BITS: u32 = u32::BITS;

    fn new_cell(value: Self) -> Self::Cell {
        SplitCell::new(value.0 as u128)
    }

    fn exchange(cell: &Self::Cell, value: Self) -> Self {
        Self(cell.exchange(value.0 as u128) as u32)
    }

    fn load(cell: &Self::Cell) -> Self {
        Self(cell.load() as u32)
    }

    fn store_direct(cell: &Self::Cell, value: Self) {
        cell.write_parts(value.0 as u128);
    }

    fn load_direct(cell: &Self::Cell) -> Self {
        Self(cell.read_parts() as u32)
    }

    fn from_u64_wrapping(value: u64) -> Self {
        Self(value as u32)
    }

    fn doubled(self) -> Self {
        Self(self.0.wrapping_mul(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_returns_previous_value() {
        let cell = u32::new_cell(7);

        assert_eq!(u32::exchange(&cell, 11), 7);
        assert_eq!(u32::load(&cell), 11);
    }

    #[test]
    fn direct_accesses_round_trip() {
        let cell = u16::new_cell(0);

        u16::store_direct(&cell, 512);
        assert_eq!(u16::load_direct(&cell), 512);
        assert_eq!(u16::load(&cell), 512);
    }

    #[test]
    fn values_wrap_into_narrow_elements() {
        assert_eq!(u8::from_u64_wrapping(300), 44);
        assert_eq!(u16::from_u64_wrapping(65_537), 1);
        assert_eq!(u32::from_u64_wrapping(u32::MAX as u64 + 5), 4);
        assert_eq!(u64::from_u64_wrapping(u64::MAX), u64::MAX);
    }

    #[test]
    fn doubling_wraps_on_overflow() {
        assert_eq!(200u8.doubled(), 144);
        assert_eq!(21u32.doubled(), 42);
        assert_eq!((u128::MAX / 2 + 1).doubled(), 0);
    }

    #[test]
    fn wide_cell_keeps_both_halves() {
        let value = (0xdead_beef_u128 << 64) | 0x1234;
        let cell = u128::new_cell(value);

        assert_eq!(u128::load_direct(&cell), value);
        assert_eq!(u128::exchange(&cell, 1), value);
        assert_eq!(u128::load(&cell), 1);

        u128::store_direct(&cell, u128::MAX);
        assert_eq!(u128::load(&cell), u128::MAX);
    }

    #[test]
    fn bytewise_cell_behaves_like_a_u32() {
        let cell = BytewiseU32::new_cell(BytewiseU32(0x0102_0304));

        assert_eq!(BytewiseU32::load_direct(&cell), BytewiseU32(0x0102_0304));
        assert_eq!(
            BytewiseU32::exchange(&cell, BytewiseU32(70_000)),
            BytewiseU32(0x0102_0304)
        );
        assert_eq!(BytewiseU32::load(&cell), BytewiseU32(70_000));
        assert_eq!(BytewiseU32::from_u64_wrapping(u32::MAX as u64 + 3), BytewiseU32(2));
        assert_eq!(BytewiseU32(u32::MAX).doubled(), BytewiseU32(u32::MAX - 1));
        assert_eq!(BytewiseU32(65_536).to_string(), "65536");
    }

    #[test]
    fn interleaved_byte_stores_leave_an_unwritten_value() {
        // Two writes one iteration apart, across a byte boundary.
        let (first, second) = (0x0001_00ffu32, 0x0001_0100u32);
        let cell = BytewiseU32::new_cell(BytewiseU32(first));

        // The second writer got its low byte in, then the first one stored everything but its
        // low byte before the second writer finished.
        cell.parts[0].set((second & 0xff) as u64);
        for (k, part) in cell.parts.iter().enumerate().skip(1) {
            part.set(((first >> (8 * k)) & 0xff) as u64);
        }

        let torn = BytewiseU32::load_direct(&cell).0;
        assert_eq!(torn, 0x0001_0000);
        assert!(torn != first && torn != second);
    }
}
