use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use super::outbound::Outbound;
use crate::protocol::client_events::ClientEvent;
use crate::{Error, Result};

/// Handle to one deferred send.
#[derive(Debug, Clone)]
pub struct ScheduledSend {
    handle: AbortHandle,
}

impl ScheduledSend {
    /// Cancel the send if it has not gone out yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Sends outbound events after a fixed delay without blocking the caller.
///
/// Every pending send is tracked so a session reset (or dropping the
/// scheduler) cancels whatever has not been delivered.
pub struct Scheduler {
    outbound: Arc<dyn Outbound>,
    delay: Duration,
    pending: Vec<AbortHandle>,
}

impl Scheduler {
    #[must_use]
    pub fn new(outbound: Arc<dyn Outbound>, delay: Duration) -> Self {
        Self {
            outbound,
            delay,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Spawn a task that delivers `event` once the delay has elapsed.
    ///
    /// # Errors
    /// Returns `NoRuntime` when called outside a tokio runtime.
    pub fn schedule(&mut self, event: ClientEvent) -> Result<ScheduledSend> {
        let kind = event.kind();
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime(kind))?;
        self.pending.retain(|handle| !handle.is_finished());

        let outbound = Arc::clone(&self.outbound);
        let delay = self.delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            match outbound.send(event).await {
                Ok(()) => tracing::debug!("Sent deferred {kind}"),
                Err(err) => tracing::warn!("Deferred {kind} failed: {err}"),
            }
        });

        let handle = task.abort_handle();
        self.pending.push(handle.clone());
        Ok(ScheduledSend { handle })
    }

    /// Number of sends that have neither fired nor been cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|handle| !handle.is_finished()).count()
    }

    /// Abort every outstanding send. Returns how many were still pending.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for handle in self.pending.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            tracing::debug!("Cancelled {cancelled} deferred send(s)");
        }
        cancelled
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn scheduler(delay_ms: u64) -> (Scheduler, mpsc::Receiver<ClientEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (Scheduler::new(Arc::new(tx), Duration::from_millis(delay_ms)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn sends_after_delay() {
        let (mut scheduler, mut rx) = scheduler(500);
        scheduler.schedule(ClientEvent::continue_with("hello")).unwrap();

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(ClientEvent::continue_with("hello")));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_send_never_fires() {
        let (mut scheduler, mut rx) = scheduler(500);
        let first = scheduler.schedule(ClientEvent::continue_with("one")).unwrap();
        scheduler.schedule(ClientEvent::continue_with("two")).unwrap();

        first.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(rx.recv().await, Some(ClientEvent::continue_with("two")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_drops_pending_sends() {
        let (mut scheduler, mut rx) = scheduler(500);
        scheduler.schedule(ClientEvent::continue_with("one")).unwrap();
        scheduler.schedule(ClientEvent::continue_with("two")).unwrap();
        assert_eq!(scheduler.pending(), 2);

        assert_eq!(scheduler.cancel_all(), 2);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn scheduling_without_runtime_is_an_error() {
        let (mut scheduler, _rx) = scheduler(0);
        let err = scheduler.schedule(ClientEvent::continue_with("x")).unwrap_err();
        assert!(matches!(err, Error::NoRuntime("response.create")));
    }
}
