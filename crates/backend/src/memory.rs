use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use exam_core::model::{ActivityEvent, AnswerRecord, Question, SessionId, Snapshot};
use tokio::sync::Semaphore;

use crate::api::{ExamBackend, ProvisionedQuestion};
use crate::error::BackendError;

/// In-memory backend for tests and offline prototyping.
///
/// Records every write, hands out questions from a bank, and can be scripted
/// to fail or to hold `next_question` replies until released.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    gate: Arc<Semaphore>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            gate: Arc::new(Semaphore::new(0)),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    bank: VecDeque<Question>,
    total_questions: usize,
    total_override: Option<usize>,
    next_question_error: Option<String>,
    hold_next_question: bool,
    fail_saves: bool,
    fail_telemetry: bool,
    next_question_calls: usize,
    answers: Vec<AnswerRecord>,
    snapshots: Vec<Snapshot>,
    activity: Vec<ActivityEvent>,
    submissions: Vec<SessionId>,
}

impl InMemoryBackend {
    /// Backend whose session already holds `total_questions` questions.
    #[must_use]
    pub fn new(total_questions: usize) -> Self {
        let backend = Self::default();
        backend.lock().total_questions = total_questions;
        backend
    }

    /// Queue questions handed out by `next_question`, in order.
    #[must_use]
    pub fn with_question_bank(self, questions: impl IntoIterator<Item = Question>) -> Self {
        self.lock().bank.extend(questions);
        self
    }

    /// Make `next_question` answer with an `{error}` body.
    pub fn fail_next_question(&self, message: impl Into<String>) {
        self.lock().next_question_error = Some(message.into());
    }

    /// Report `total` instead of the real count on the next replies.
    pub fn override_reported_total(&self, total: Option<usize>) {
        self.lock().total_override = total;
    }

    /// Hold `next_question` replies until `release_next_question` is called.
    pub fn hold_next_question(&self, hold: bool) {
        self.lock().hold_next_question = hold;
    }

    /// Let `count` held `next_question` calls proceed.
    pub fn release_next_question(&self, count: usize) {
        self.gate.add_permits(count);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn fail_telemetry(&self, fail: bool) {
        self.lock().fail_telemetry = fail;
    }

    #[must_use]
    pub fn next_question_calls(&self) -> usize {
        self.lock().next_question_calls
    }

    #[must_use]
    pub fn answers(&self) -> Vec<AnswerRecord> {
        self.lock().answers.clone()
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.lock().snapshots.clone()
    }

    #[must_use]
    pub fn activity(&self) -> Vec<ActivityEvent> {
        self.lock().activity.clone()
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<SessionId> {
        self.lock().submissions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ExamBackend for InMemoryBackend {
    async fn next_question(
        &self,
        _session_id: &SessionId,
    ) -> Result<ProvisionedQuestion, BackendError> {
        let hold = {
            let mut state = self.lock();
            state.next_question_calls += 1;
            state.hold_next_question
        };
        if hold {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|err| BackendError::Unavailable(err.to_string()))?;
            permit.forget();
        }

        let mut state = self.lock();
        if let Some(message) = state.next_question_error.clone() {
            return Err(BackendError::Rejected(message));
        }
        let question = state
            .bank
            .pop_front()
            .ok_or_else(|| BackendError::Rejected("Failed to generate question".to_string()))?;
        state.total_questions += 1;

        Ok(ProvisionedQuestion {
            question,
            total_questions: state.total_override.unwrap_or(state.total_questions),
        })
    }

    async fn save_answer(&self, record: &AnswerRecord) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(BackendError::Status(500));
        }
        state.answers.push(record.clone());
        Ok(())
    }

    async fn upload_snapshot(&self, snapshot: &Snapshot) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.fail_telemetry {
            return Err(BackendError::Unavailable("telemetry disabled".to_string()));
        }
        state.snapshots.push(snapshot.clone());
        Ok(())
    }

    async fn log_activity(&self, event: &ActivityEvent) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.fail_telemetry {
            return Err(BackendError::Unavailable("telemetry disabled".to_string()));
        }
        state.activity.push(event.clone());
        Ok(())
    }

    async fn submit_exam(&self, session_id: &SessionId) -> Result<(), BackendError> {
        self.lock().submissions.push(session_id.clone());
        Ok(())
    }
}
