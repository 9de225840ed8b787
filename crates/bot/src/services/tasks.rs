//! Launching background workflows that outlive the request.

use std::future::Future;
use std::pin::Pin;

use tracing::{Instrument, debug, info_span};

/// A boxed background workflow.
pub type BoxTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Starts workflows detached from the caller.
///
/// The caller keeps no handle; a launched workflow reports its own failures
/// through logging.
pub trait TaskLauncher: Send + Sync {
    /// Start `task` under `name`.
    fn launch(&self, name: &'static str, task: BoxTask);
}

/// Spawns each workflow onto the Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedLauncher;

impl TaskLauncher for DetachedLauncher {
    fn launch(&self, name: &'static str, task: BoxTask) {
        debug!(workflow = name, "Launching background workflow");
        tokio::spawn(task.instrument(info_span!("workflow", name)));
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use collecting::CollectingLauncher;

#[cfg(any(test, feature = "test-support"))]
mod collecting {
    use std::sync::{Mutex, PoisonError};

    use super::{BoxTask, TaskLauncher};

    /// Holds launched workflows until the test runs them.
    #[derive(Default)]
    pub struct CollectingLauncher {
        queued: Mutex<Vec<(&'static str, BoxTask)>>,
    }

    impl std::fmt::Debug for CollectingLauncher {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("CollectingLauncher")
                .field("queued", &self.launched())
                .finish()
        }
    }

    impl CollectingLauncher {
        /// Create an empty launcher.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Names of the workflows waiting to run.
        #[must_use]
        pub fn launched(&self) -> Vec<&'static str> {
            self.queued
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(name, _)| *name)
                .collect()
        }

        /// Run every queued workflow to completion, in launch order.
        pub async fn run_all(&self) {
            let queued = std::mem::take(&mut *self.queued.lock().unwrap_or_else(PoisonError::into_inner));
            for (_, task) in queued {
                task.await;
            }
        }
    }

    impl TaskLauncher for CollectingLauncher {
        fn launch(&self, name: &'static str, task: BoxTask) {
            self.queued
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((name, task));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_detached_launcher_runs_task() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        DetachedLauncher.launch(
            "test",
            Box::pin(async move {
                let _ = tx.send(42);
            }),
        );

        let value = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("task ran")
            .expect("sender kept");
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_collecting_launcher_defers_until_run() {
        let launcher = CollectingLauncher::new();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        launcher.launch(
            "deferred",
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
            }),
        );

        assert_eq!(launcher.launched(), ["deferred"]);
        assert!(!ran.load(Ordering::SeqCst));

        launcher.run_all().await;
        assert!(ran.load(Ordering::SeqCst));
        assert!(launcher.launched().is_empty());
    }
}
