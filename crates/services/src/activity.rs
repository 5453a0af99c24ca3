use std::sync::Arc;

use async_trait::async_trait;
use backend::{BackendError, ExamBackend};
use exam_core::Clock;
use exam_core::model::{ActivityEvent, ActivityKind, SessionId};

use crate::delivery::{Courier, DeliveryReceipt, DispatchQueue};
use crate::tasks::SessionTasks;

/// Fire-and-forget emitter of integrity events.
#[derive(Clone)]
pub struct ActivityReporter {
    session_id: SessionId,
    clock: Clock,
    queue: DispatchQueue<ActivityEvent>,
}

struct ActivityCourier {
    backend: Arc<dyn ExamBackend>,
}

#[async_trait]
impl Courier<ActivityEvent> for ActivityCourier {
    async fn deliver(&self, event: &ActivityEvent) -> Result<(), BackendError> {
        self.backend.log_activity(event).await
    }
}

impl ActivityReporter {
    #[must_use]
    pub fn spawn(
        backend: Arc<dyn ExamBackend>,
        session_id: SessionId,
        clock: Clock,
        tasks: &mut SessionTasks,
    ) -> Self {
        let queue = DispatchQueue::spawn("activity", ActivityCourier { backend }, tasks);
        Self {
            session_id,
            clock,
            queue,
        }
    }

    /// Emits one event stamped with the current time.
    pub fn report(&self, kind: ActivityKind, details: impl Into<String>) -> DeliveryReceipt {
        let event = ActivityEvent::new(
            self.session_id.clone(),
            kind,
            details,
            self.clock.now(),
        );
        tracing::debug!(session_id = %self.session_id, kind = %event.kind, "activity event");
        self.queue.enqueue(event)
    }
}
