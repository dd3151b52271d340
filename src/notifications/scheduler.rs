use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::debug;

use super::lock;
use super::types::NotificationId;

/// One-shot removal timers, one tokio task per notification
#[derive(Debug, Clone, Default)]
pub struct RemovalScheduler {
    pending: Arc<Mutex<HashMap<NotificationId, JoinHandle<()>>>>,
}

impl RemovalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_expire` once `delay` has elapsed, unless cancelled first.
    ///
    /// The timer task is spawned on `runtime`. Scheduling again under the same id
    /// replaces (and aborts) the earlier timer.
    pub fn schedule<F>(
        &self,
        runtime: &Handle,
        id: NotificationId,
        delay: Duration,
        on_expire: F,
    ) where
        F: FnOnce() + Send + 'static,
    {
        // Held across the spawn so the task cannot finish before it is registered
        let mut pending = lock(&self.pending);
        let registry = Arc::clone(&self.pending);

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&registry).remove(&id);
            on_expire();
        });

        if let Some(previous) = pending.insert(id, handle) {
            previous.abort();
        }
        debug!("Scheduled removal of {} in {:?}", id, delay);
    }

    /// Abort a pending removal. Returns `false` if none was pending.
    pub fn cancel(&self, id: NotificationId) -> bool {
        match lock(&self.pending).remove(&id) {
            Some(handle) => {
                handle.abort();
                debug!("Cancelled removal of {}", id);
                true
            }
            None => false,
        }
    }

    /// Abort every pending removal, returning how many were cancelled
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = lock(&self.pending).drain().collect();
        let count = drained.len();
        for (_, handle) in drained {
            handle.abort();
        }
        if count > 0 {
            debug!("Cancelled {} pending removals", count);
        }
        count
    }

    pub fn is_pending(&self, id: NotificationId) -> bool {
        lock(&self.pending).contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let hook = Arc::clone(&fired);
        (fired, move || {
            hook.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let scheduler = RemovalScheduler::new();
        let id = NotificationId::new();
        let (fired, hook) = counter();

        scheduler.schedule(&Handle::current(), id, Duration::from_millis(500), hook);
        assert!(scheduler.is_pending(id));

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending(id));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let scheduler = RemovalScheduler::new();
        let id = NotificationId::new();
        let (fired, hook) = counter();

        scheduler.schedule(&Handle::current(), id, Duration::from_millis(100), hook);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_timer() {
        let scheduler = RemovalScheduler::new();
        let id = NotificationId::new();
        let (first, first_hook) = counter();
        let (second, second_hook) = counter();

        scheduler.schedule(&Handle::current(), id, Duration::from_millis(100), first_hook);
        scheduler.schedule(&Handle::current(), id, Duration::from_millis(300), second_hook);
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(Duration::from_millis(301)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let scheduler = RemovalScheduler::new();
        let (fired, _) = counter();
        for _ in 0..3 {
            let hook = Arc::clone(&fired);
            let delay = Duration::from_millis(50);
            scheduler.schedule(&Handle::current(), NotificationId::new(), delay, move || {
                hook.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(scheduler.cancel_all(), 3);
        assert_eq!(scheduler.cancel_all(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
