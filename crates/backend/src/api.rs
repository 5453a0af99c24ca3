use async_trait::async_trait;
use exam_core::model::{ActivityEvent, AnswerRecord, Question, SessionId, Snapshot};

use crate::error::BackendError;

/// One question materialized by the backend plus its authoritative total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedQuestion {
    pub question: Question,
    pub total_questions: usize,
}

/// Contract for the exam backend the client talks to.
///
/// Only `next_question` has a meaningful response body; the other writes are
/// judged by status alone.
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// Ask the backend to materialize one more question for an endless session.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` when the backend answers with an
    /// `{error}` body, or transport/decode errors.
    async fn next_question(
        &self,
        session_id: &SessionId,
    ) -> Result<ProvisionedQuestion, BackendError>;

    /// Persist one answer selection.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` for non-success statuses or transport failures.
    async fn save_answer(&self, record: &AnswerRecord) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// Returns `BackendError` for non-success statuses or transport failures.
    async fn upload_snapshot(&self, snapshot: &Snapshot) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// Returns `BackendError` for non-success statuses or transport failures.
    async fn log_activity(&self, event: &ActivityEvent) -> Result<(), BackendError>;

    /// Submit the exam for scoring.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` for non-success statuses or transport failures.
    async fn submit_exam(&self, session_id: &SessionId) -> Result<(), BackendError>;
}
