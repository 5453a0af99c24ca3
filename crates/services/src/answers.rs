use std::sync::Arc;

use async_trait::async_trait;
use backend::{BackendError, ExamBackend};
use exam_core::model::{AnswerRecord, QuestionId, SessionId};

use crate::delivery::{Courier, DeliveryReceipt, DispatchQueue};
use crate::state::SharedNavigation;
use crate::tasks::SessionTasks;

/// Best-effort answer persistence.
///
/// A question is marked answered only after the backend confirms the save.
/// Failed saves are dropped without retry or user feedback.
#[derive(Clone)]
pub struct AnswerStore {
    session_id: SessionId,
    queue: DispatchQueue<PendingAnswer>,
}

/// A record plus the position of the question it answers.
struct PendingAnswer {
    number: usize,
    record: AnswerRecord,
}

struct AnswerCourier {
    backend: Arc<dyn ExamBackend>,
    state: SharedNavigation,
}

#[async_trait]
impl Courier<PendingAnswer> for AnswerCourier {
    async fn deliver(&self, pending: &PendingAnswer) -> Result<(), BackendError> {
        let record = &pending.record;
        self.backend.save_answer(record).await?;
        let marked = self.state.update(|nav| nav.mark_answered(pending.number));
        tracing::debug!(
            question_id = %record.question_id,
            number = pending.number,
            marked,
            "answer confirmed"
        );
        Ok(())
    }
}

impl AnswerStore {
    #[must_use]
    pub fn spawn(
        backend: Arc<dyn ExamBackend>,
        session_id: SessionId,
        state: SharedNavigation,
        tasks: &mut SessionTasks,
    ) -> Self {
        let queue = DispatchQueue::spawn("answers", AnswerCourier { backend, state }, tasks);
        Self { session_id, queue }
    }

    /// Queues `selected` for the question at position `number`.
    pub fn save(
        &self,
        number: usize,
        question_id: QuestionId,
        selected: impl Into<String>,
    ) -> DeliveryReceipt {
        let record = AnswerRecord::new(self.session_id.clone(), question_id, selected);
        self.queue.enqueue(PendingAnswer { number, record })
    }
}
