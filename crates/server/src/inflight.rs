use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub completed: usize,
    pub aborted: usize,
}

/// Dispatch tasks started by the webhook and not yet joined.
#[derive(Clone, Default)]
pub struct InFlightTasks {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl InFlightTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Waits up to `grace` for running dispatches, then aborts the rest.
    pub async fn drain(&self, grace: Duration) -> DrainReport {
        let mut tasks = self.tasks.lock().await;
        let mut report = DrainReport::default();

        let _ = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {
                report.completed += 1;
            }
        })
        .await;

        report.aborted = tasks.len();
        if report.aborted > 0 {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::InFlightTasks;

    #[tokio::test]
    async fn drain_waits_for_short_tasks() {
        let tasks = InFlightTasks::new();
        let finished = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let finished = Arc::clone(&finished);
            tasks
                .spawn(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        let report = tasks.drain(Duration::from_secs(5)).await;
        assert_eq!(report.aborted, 0);
        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert_eq!(tasks.len().await, 0);
    }

    #[tokio::test]
    async fn drain_aborts_tasks_past_the_grace_period() {
        let tasks = InFlightTasks::new();
        tasks.spawn(async { tokio::time::sleep(Duration::from_secs(60)).await }).await;

        let report = tasks.drain(Duration::from_millis(20)).await;
        assert_eq!(report.aborted, 1);
        assert_eq!(tasks.len().await, 0);
    }
}
