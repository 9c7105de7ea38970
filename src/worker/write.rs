use rand::Rng;

use crate::storage::{BufferId, BufferPair, Element, WriteMode};

/// The value written at `index` during iteration `iteration`: `iteration + ceil(index *
/// fraction * 10)`, wrapping on overflow.
pub fn planned_value(iteration: u64, index: usize, fraction: f64) -> u64 {
    let modifier = (index as f64 * fraction * 10.0).ceil() as u64;
    iteration.wrapping_add(modifier)
}

/// One write of the stress loop, drawn at random.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedWrite {
    pub iteration: u64,
    pub index: usize,
    pub fraction: f64,
    pub target: BufferId,
    pub value: u64,
}

impl PlannedWrite {
    /// Draws the index and fraction of the write for `iteration`.
    ///
    /// # Arguments
    /// * `rng` - The source of randomness.
    /// * `iteration` - The current value of the loop counter.
    /// * `buffers` - The buffers the write is meant for, must not be empty.
    pub fn draw<R, T>(rng: &mut R, iteration: u64, buffers: &BufferPair<T>) -> Self
    where
        R: Rng + ?Sized,
        T: Element,
    {
        let index = rng.random_range(0..buffers.len());
        let fraction: f64 = rng.random();

        Self {
            iteration,
            index,
            fraction,
            target: buffers.target_for(index),
            value: planned_value(iteration, index, fraction),
        }
    }

    /// The value as it lands in an element of type `T`.
    pub fn element<T: Element>(&self) -> T {
        T::from_u64_wrapping(self.value)
    }

    /// Performs the write.
    pub fn apply<T: Element>(
        &self,
        buffers: &BufferPair<T>,
        mode: WriteMode,
    ) -> crate::storage::Result<()> {
        buffers
            .get(self.target)
            .write(self.index, self.element(), mode)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn value_formula() {
        assert_eq!(planned_value(300_000, 0, 0.99), 300_000);
        assert_eq!(planned_value(300_000, 3, 0.0), 300_000);
        assert_eq!(planned_value(300_000, 3, 0.5), 300_015);
        assert_eq!(planned_value(600_000, 4, 0.01), 600_001);
        assert_eq!(planned_value(u64::MAX, 1, 0.5), 4);
    }

    #[test]
    fn drawn_writes_stay_in_bounds_and_follow_the_formula() {
        let mut rng = StdRng::seed_from_u64(42);
        let buffers = BufferPair::<u32>::initialize(5);

        for iteration in (1..=50).map(|k| k * 300_000) {
            let write = PlannedWrite::draw(&mut rng, iteration, &buffers);

            assert!(write.index < 5);
            assert!((0.0..1.0).contains(&write.fraction));
            assert_eq!(write.target, buffers.target_for(write.index));
            assert_eq!(
                write.value,
                planned_value(iteration, write.index, write.fraction)
            );
        }
    }

    #[test]
    fn apply_lands_in_the_target_buffer() {
        let buffers = BufferPair::<u32>::initialize(5);
        let write = PlannedWrite {
            iteration: 10,
            index: 4,
            fraction: 0.5,
            target: BufferId::A,
            value: 30,
        };

        write.apply(&buffers, WriteMode::Atomic).unwrap();

        assert_eq!(buffers.a().snapshot(), [1, 2, 3, 4, 30]);
        assert_eq!(buffers.b().snapshot(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn values_wrap_into_the_element_type() {
        let write = PlannedWrite {
            iteration: 256,
            index: 0,
            fraction: 0.0,
            target: BufferId::B,
            value: 256,
        };

        assert_eq!(write.element::<u8>(), 0);
        assert_eq!(write.element::<u16>(), 256);
    }
}
