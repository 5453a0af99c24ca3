//! Background tasks tied to the lifetime of one exam session.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cancellation signal handed to every session task.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolves once the session is shut down or its owner is gone.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Ends the session without waiting for its tasks.
#[derive(Debug, Clone)]
pub struct Canceller {
    trigger: Arc<watch::Sender<bool>>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.trigger.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.trigger.borrow()
    }
}

/// Owns the session's tasks. `shutdown` cancels and joins them; dropping
/// the set aborts whatever is still running.
#[derive(Debug)]
pub struct SessionTasks {
    trigger: Arc<watch::Sender<bool>>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Default for SessionTasks {
    fn default() -> Self {
        let (trigger, _) = watch::channel(false);
        Self {
            trigger: Arc::new(trigger),
            handles: Vec::new(),
        }
    }
}

impl SessionTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.trigger.subscribe(),
        }
    }

    #[must_use]
    pub fn canceller(&self) -> Canceller {
        Canceller {
            trigger: Arc::clone(&self.trigger),
        }
    }

    /// Spawns `task` on the current runtime and tracks it under `name`.
    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.push((name, tokio::spawn(task)));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.trigger.borrow()
    }

    /// Number of tracked tasks that have not finished yet.
    #[must_use]
    pub fn running(&self) -> usize {
        self.handles
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    /// Cancels every task and waits for each to stop.
    pub async fn shutdown(&mut self) {
        self.trigger.send_replace(true);
        for (name, handle) in self.handles.drain(..) {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    tracing::warn!(task = name, error = %err, "session task failed");
                }
            }
        }
        tracing::debug!("session tasks stopped");
    }
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        self.trigger.send_replace(true);
        for (_, handle) in &self.handles {
            handle.abort();
        }
    }
}
