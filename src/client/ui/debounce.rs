//! Trailing-edge debounce for search input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delay between the last keystroke and the search request.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Delivers only the last value pushed within each quiet period.
///
/// Every [`push`](Self::push) restarts the timer; when it expires the most
/// recent value is sent to the receiver returned by [`new`](Self::new).
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its values arrive on.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { delay, tx, pending: None }, rx)
    }

    /// Record a new value, cancelling any value still waiting.
    ///
    /// Must be called within a Tokio runtime.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver may be gone; nothing left to notify.
            let _ = tx.send(value);
        }));
    }

    /// Drop the waiting value, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a value is waiting for its delay to pass.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_delivers_only_last_value() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        for text in ["w", "we", "web", "webs", "websi"] {
            debouncer.push(text.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(SEARCH_DEBOUNCE).await;
        assert_eq!(rx.recv().await.as_deref(), Some("websi"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_deliver() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (mut debouncer, mut rx) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.push("draft");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
