//! Best-effort delivery of fire-and-forget writes.
//!
//! Each source owns one ordered queue drained by a single worker, so writes
//! reach the backend in the order they were enqueued. Failures are logged and
//! dropped; nothing is retried.

use async_trait::async_trait;
use backend::BackendError;
use tokio::sync::{mpsc, oneshot};

use crate::tasks::{SessionTasks, ShutdownSignal};

/// Final state of one enqueued write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The backend acknowledged the write.
    Confirmed,
    /// The write was lost; the reason is for diagnostics only.
    Dropped(String),
}

impl Delivery {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Handle to a write's outcome. Awaiting it is optional.
#[derive(Debug)]
pub struct DeliveryReceipt {
    rx: oneshot::Receiver<Delivery>,
}

impl DeliveryReceipt {
    pub async fn outcome(self) -> Delivery {
        self.rx
            .await
            .unwrap_or_else(|_| Delivery::Dropped("session ended".to_string()))
    }
}

/// Performs the actual write for one queued item.
#[async_trait]
pub trait Courier<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    async fn deliver(&self, item: &T) -> Result<(), BackendError>;
}

struct Job<T> {
    item: T,
    reply: oneshot::Sender<Delivery>,
}

/// Sending half of an ordered delivery queue.
pub struct DispatchQueue<T> {
    source: &'static str,
    tx: mpsc::UnboundedSender<Job<T>>,
}

impl<T> Clone for DispatchQueue<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> DispatchQueue<T> {
    /// Spawns the worker for `source` into `tasks` and returns its queue.
    pub fn spawn<C>(source: &'static str, courier: C, tasks: &mut SessionTasks) -> Self
    where
        C: Courier<T>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tasks.spawn(source, drain(source, rx, courier, tasks.signal()));
        Self { source, tx }
    }

    /// Queues `item` behind every earlier item from this source.
    pub fn enqueue(&self, item: T) -> DeliveryReceipt {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Job { item, reply }).is_err() {
            tracing::debug!(source = self.source, "queue closed; write dropped");
        }
        DeliveryReceipt { rx }
    }
}

async fn drain<T, C>(
    source: &'static str,
    mut rx: mpsc::UnboundedReceiver<Job<T>>,
    courier: C,
    mut shutdown: ShutdownSignal,
) where
    T: Send + Sync + 'static,
    C: Courier<T>,
{
    loop {
        let job = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let outcome = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            result = courier.deliver(&job.item) => result,
        };
        let delivery = match outcome {
            Ok(()) => Delivery::Confirmed,
            Err(err) => {
                tracing::debug!(source, error = %err, "best-effort write dropped");
                Delivery::Dropped(err.to_string())
            }
        };
        let _ = job.reply.send(delivery);
    }
    tracing::debug!(source, "dispatcher stopped");
}
