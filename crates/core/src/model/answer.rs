use crate::model::{QuestionId, SessionId};

/// Answer write emitted by the client. The backend owns the durable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub selected_answer: String,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(
        session_id: SessionId,
        question_id: QuestionId,
        selected_answer: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            question_id,
            selected_answer: selected_answer.into(),
        }
    }
}
