//! JSON bodies exchanged with the exam backend.

use exam_core::model::{
    ActivityEvent, ActivityKind, AnswerRecord, Question, QuestionId, SessionId, Snapshot,
};
use serde::{Deserialize, Serialize};

use crate::api::ProvisionedQuestion;
use crate::error::BackendError;

pub const NEXT_QUESTION_PATH: &str = "api/next_question/";
pub const SAVE_ANSWER_PATH: &str = "api/save_answer/";
pub const UPLOAD_SNAPSHOT_PATH: &str = "api/upload_snapshot/";
pub const LOG_ACTIVITY_PATH: &str = "api/log_activity/";

/// Submission posts to the exam page itself.
#[must_use]
pub fn submit_path(session_id: &SessionId) -> String {
    format!("exam/{session_id}/")
}

#[derive(Debug, Serialize)]
pub struct NextQuestionRequest<'a> {
    pub session_id: &'a SessionId,
}

#[derive(Debug, Serialize)]
pub struct SaveAnswerRequest<'a> {
    pub session_id: &'a SessionId,
    pub question_id: &'a QuestionId,
    pub selected_answer: &'a str,
}

impl<'a> From<&'a AnswerRecord> for SaveAnswerRequest<'a> {
    fn from(record: &'a AnswerRecord) -> Self {
        Self {
            session_id: &record.session_id,
            question_id: &record.question_id,
            selected_answer: &record.selected_answer,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadSnapshotRequest<'a> {
    pub session_id: &'a SessionId,
    pub image_data: &'a str,
}

impl<'a> From<&'a Snapshot> for UploadSnapshotRequest<'a> {
    fn from(snapshot: &'a Snapshot) -> Self {
        Self {
            session_id: &snapshot.session_id,
            image_data: &snapshot.image_data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogActivityRequest<'a> {
    pub session_id: &'a SessionId,
    pub event_type: &'a ActivityKind,
    pub details: &'a str,
}

impl<'a> From<&'a ActivityEvent> for LogActivityRequest<'a> {
    fn from(event: &'a ActivityEvent) -> Self {
        Self {
            session_id: &event.session_id,
            event_type: &event.kind,
            details: &event.details,
        }
    }
}

/// `next_question` reply: either an `{error}` body or a materialized question.
///
/// The error shape is tried first so an error body wins even when it carries
/// extra fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NextQuestionReply {
    Failure { error: String },
    Success(NextQuestionPayload),
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionPayload {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub total_questions: usize,
}

impl NextQuestionReply {
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` for error bodies and
    /// `BackendError::Decode` when the question fails validation.
    pub fn into_provisioned(self) -> Result<ProvisionedQuestion, BackendError> {
        match self {
            Self::Failure { error } => Err(BackendError::Rejected(error)),
            Self::Success(payload) => {
                let question = Question::new(payload.id, payload.text, payload.options)
                    .map_err(|err| BackendError::Decode(err.to_string()))?;
                Ok(ProvisionedQuestion {
                    question,
                    total_questions: payload.total_questions,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_is_a_rejection() {
        let reply: NextQuestionReply =
            serde_json::from_str(r#"{"error": "Not an endless session"}"#).unwrap();
        let err = reply.into_provisioned().unwrap_err();
        assert!(matches!(err, BackendError::Rejected(msg) if msg == "Not an endless session"));
    }

    #[test]
    fn success_body_materializes_question() {
        let reply: NextQuestionReply = serde_json::from_str(
            r#"{"id": 42, "text": "2 + 2?", "options": ["3", "4"], "total_questions": 6}"#,
        )
        .unwrap();
        let provisioned = reply.into_provisioned().unwrap();
        assert_eq!(provisioned.question.id(), &QuestionId::from(42));
        assert_eq!(provisioned.question.options(), ["3", "4"]);
        assert_eq!(provisioned.total_questions, 6);
    }

    #[test]
    fn question_without_options_is_a_decode_error() {
        let reply: NextQuestionReply = serde_json::from_str(
            r#"{"id": 1, "text": "?", "options": [], "total_questions": 2}"#,
        )
        .unwrap();
        assert!(matches!(
            reply.into_provisioned(),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn activity_body_uses_wire_names() {
        let event = ActivityEvent::new(
            SessionId::new("s-1").unwrap(),
            ActivityKind::FocusLost,
            "Window lost focus",
            exam_core::time::fixed_now(),
        );
        let body = serde_json::to_value(LogActivityRequest::from(&event)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "session_id": "s-1",
                "event_type": "focus_lost",
                "details": "Window lost focus",
            })
        );
    }
}
