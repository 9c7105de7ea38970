use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::{CancellationToken, DropGuard};

/// A closure fired on a fixed period until its owner cancels it.
///
/// The first firing happens right away, each firing then schedules the next one `period`
/// later. Dropping the handle cancels the task as well.
#[derive(Debug)]
pub struct RepeatingTask {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Spawns `tick` on the current tokio runtime.
    ///
    /// # Arguments
    /// * `period` - The time between two consecutive firings.
    /// * `tick` - The work to run on every firing.
    ///
    /// # Panics
    /// If called outside of a tokio runtime.
    pub fn spawn<F>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = period.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => tick(),
                }
            }
        });

        Self {
            token,
            task: Some(task),
        }
    }

    /// Stops any future firing. A firing already in progress runs to completion.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A guard that cancels this task when dropped, even while unwinding.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Cancels the task and waits until it is gone.
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    fn counting(period: Duration) -> (RepeatingTask, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let task = RepeatingTask::spawn(period, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        (task, fired)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fires_immediately_then_repeats() {
        let (task, fired) = counting(Duration::from_millis(10));

        time::sleep(Duration::from_millis(20)).await;
        assert!(fired.load(Ordering::SeqCst) >= 1);

        time::sleep(Duration::from_millis(60)).await;
        assert!(fired.load(Ordering::SeqCst) >= 3);

        task.stop().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stops_firing_once_cancelled() {
        let (task, fired) = counting(Duration::from_millis(5));
        time::sleep(Duration::from_millis(20)).await;

        task.stop().await;
        let after_stop = fired.load(Ordering::SeqCst);

        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drop_guard_cancels() {
        let (task, fired) = counting(Duration::from_millis(5));

        {
            let _guard = task.cancel_on_drop();
        }
        assert!(task.is_cancelled());

        time::sleep(Duration::from_millis(10)).await;
        let settled = fired.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), settled);
    }
}
