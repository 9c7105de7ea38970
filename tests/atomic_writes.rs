mod common;

use common::schedule;
use shmem_stress::{
    relay::{self, SourceId},
    storage::{BufferId, BufferPair, Element},
    worker::{PlannedWrite, Worker, WorkerConfig},
};
use tokio::task::JoinSet;

/// Runs `workers` atomic writers and checks that every element ends up holding either its
/// initial value or a value some writer put there.
async fn only_attempted_values_survive<T: Element>(workers: usize, elements: usize) {
    let buffers = BufferPair::<T>::initialize(elements);
    let schedule = schedule(200_000, u64::MAX, 50);
    let mut tasks = JoinSet::new();

    for index in 0..workers {
        let config = WorkerConfig::new(buffers.clone(), true, index)
            .with_schedule(schedule)
            .recording_writes(true);
        let (tx, _) = relay::channel(SourceId(index + 1));
        tasks.spawn_blocking(move || Worker::new(config, tx).run());
    }

    let mut journal: Vec<PlannedWrite> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap().unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.writes, schedule.writes());
        journal.extend(result.journal);
    }

    let (a, b) = buffers.snapshot_atomic();
    for (id, values) in [(BufferId::A, a), (BufferId::B, b)] {
        assert_eq!(values.len(), elements);

        for (ix, value) in values.into_iter().enumerate() {
            let mut allowed: Vec<T> = journal
                .iter()
                .filter(|write| write.target == id && write.index == ix)
                .map(PlannedWrite::element::<T>)
                .collect();
            allowed.push(T::from_u64_wrapping(ix as u64 + 1));

            assert!(allowed.contains(&value), "{id}[{ix}] = {value}");
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn u32_atomic_writers() {
    only_attempted_values_survive::<u32>(4, 5).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn u128_atomic_writers() {
    only_attempted_values_survive::<u128>(4, 5).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn u8_atomic_writers_wrap() {
    only_attempted_values_survive::<u8>(3, 20).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn bytewise_atomic_writers() {
    only_attempted_values_survive::<shmem_stress::storage::BytewiseU32>(4, 5).await;
}
