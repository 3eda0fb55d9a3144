use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error::FeedError;

type PollFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), FeedError>> + Send + Sync>;

/// Periodic badge refresh that runs regardless of push-channel health.
///
/// The first poll happens one interval after `start`. Failures are logged
/// and otherwise ignored; the next tick simply tries again.
pub struct PollingScheduler {
    poll: PollFn,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollingScheduler {
    pub fn new<F, Fut>(poll: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), FeedError>> + Send + 'static,
    {
        Self {
            poll: Arc::new(move || poll().boxed()),
            handle: Mutex::new(None),
        }
    }

    /// Start ticking every `every`. Returns false if already running or
    /// if `every` is zero.
    pub fn start(&self, every: Duration) -> bool {
        if every.is_zero() {
            tracing::warn!("refusing to poll with a zero interval");
            return false;
        }

        let mut handle = self.handle.lock();
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let poll = Arc::clone(&self.poll);
        *handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = poll().await {
                    tracing::debug!(error = %e, "badge poll failed, keeping last value");
                }
            }
        }));
        tracing::debug!(interval_ms = every.as_millis() as u64, "polling started");
        true
    }

    /// Cancel the timer. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            tracing::debug!("polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
