//! Cancellable delayed execution.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a task after a delay unless cancelled first.
///
/// Scheduling again cancels whatever is still waiting. Once the delay has
/// elapsed the task is spawned on its own and is no longer affected by
/// [`DelayedTask::cancel`]. Dropping the handle cancels a pending task.
#[derive(Debug, Default)]
pub struct DelayedTask {
    handle: Option<JoinHandle<()>>,
}

impl DelayedTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Invalidates the waiting task. Returns true if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter_task(counter: &Arc<AtomicUsize>, amount: usize) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(amount, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = DelayedTask::new();

        task.schedule(Duration::from_millis(200), counter_task(&counter, 1));
        assert!(task.is_pending());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!task.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = DelayedTask::new();

        task.schedule(Duration::from_millis(200), counter_task(&counter, 1));
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.schedule(Duration::from_millis(200), counter_task(&counter, 10));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut task = DelayedTask::new();

        assert!(!task.cancel());
        task.schedule(Duration::from_millis(50), counter_task(&counter, 1));
        assert!(task.cancel());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut task = DelayedTask::new();
            task.schedule(Duration::from_millis(50), counter_task(&counter, 1));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
