//! One-shot delayed callbacks.
//!
//! Each scheduled callback runs on its own timer task, so concurrent
//! schedules never interfere. A callback fires at most once and never before
//! its deadline. Cancelling before the deadline guarantees it never runs;
//! cancelling afterwards is a no-op.

use std::future::Future;
use std::sync::atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info_span};

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Scheduler errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler no longer accepts work.
    #[error("scheduler is shut down")]
    ShutDown,
}

/// Runs callbacks once after a delay.
///
/// Cloning is cheap; clones share the same timers.
#[derive(Clone, Debug, Default)]
pub struct DelayedTaskScheduler {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Held while spawning so no timer slips in after shutdown begins.
    closed: Mutex<bool>,
    timers: TaskTracker,
    pending: AtomicUsize,
    next_id: AtomicU64,
}

/// Handle to a scheduled callback.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    id: u64,
    fire_at: Instant,
    state: Arc<AtomicU8>,
    cancel: Arc<Notify>,
    scheduler: Arc<Inner>,
}

impl ScheduledTask {
    /// Identifier, unique per scheduler.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Earliest instant the callback may run.
    #[must_use]
    pub const fn fire_at(&self) -> Instant {
        self.fire_at
    }

    /// Cancel the callback.
    ///
    /// Returns `true` if this call prevented the callback from running, and
    /// `false` if it already fired or was already cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.scheduler.pending.fetch_sub(1, Ordering::AcqRel);
            self.cancel.notify_one();
            debug!(task_id = self.id, "Delayed task cancelled");
        }
        cancelled
    }

    /// Whether the callback has started running.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }

    /// Whether the callback is still waiting for its deadline.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }
}

impl DelayedTaskScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once, no earlier than `delay` from now.
    ///
    /// Returns immediately; the callback runs on the Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ShutDown`] once [`shutdown`](Self::shutdown)
    /// has been called.
    pub fn schedule<F, Fut>(
        &self,
        name: &'static str,
        delay: Duration,
        callback: F,
    ) -> Result<ScheduledTask, SchedulerError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let closed = self.inner.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(SchedulerError::ShutDown);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let fire_at = Instant::now() + delay;
        let handle = ScheduledTask {
            id,
            fire_at,
            state: Arc::new(AtomicU8::new(PENDING)),
            cancel: Arc::new(Notify::new()),
            scheduler: Arc::clone(&self.inner),
        };

        let state = Arc::clone(&handle.state);
        let cancel = Arc::clone(&handle.cancel);
        let inner = Arc::clone(&self.inner);
        let span = info_span!("delayed_task", task = name, task_id = id);

        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        self.inner.timers.spawn(
            async move {
                tokio::select! {
                    () = tokio::time::sleep_until(fire_at) => {
                        if state
                            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                        {
                            inner.pending.fetch_sub(1, Ordering::AcqRel);
                            debug!("Delayed task firing");
                            callback().await;
                        }
                    }
                    () = cancel.notified() => {}
                }
            }
            .instrument(span),
        );
        drop(closed);

        debug!(task = name, task_id = id, delay_ms = delay.as_millis(), "Delayed task scheduled");
        Ok(handle)
    }

    /// Number of callbacks still waiting for their deadline.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Stop accepting work and wait until every pending callback has fired
    /// or been cancelled.
    ///
    /// Every caller waits for the same timers, so concurrent or repeated
    /// calls all return only once nothing is left pending.
    pub async fn shutdown(&self) {
        {
            let mut closed = self.inner.closed.lock().unwrap_or_else(PoisonError::into_inner);
            *closed = true;
            self.inner.timers.close();
        }

        debug!(pending = self.pending(), "Draining delayed tasks");
        self.inner.timers.wait().await;
    }
}
