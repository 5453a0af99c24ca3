use std::sync::Arc;
use std::time::Duration;

use backend::{ExamBackend, ProvisionedQuestion};
use exam_core::model::SessionId;

use crate::error::ProvisionError;

pub const DEFAULT_PROVISION_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches one more question for an endless session.
///
/// Callers hold the provisioning gate in `NavigationState`; this type only
/// bounds the request in time.
#[derive(Clone)]
pub struct QuestionProvisioner {
    backend: Arc<dyn ExamBackend>,
    timeout: Duration,
}

impl QuestionProvisioner {
    #[must_use]
    pub fn new(backend: Arc<dyn ExamBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// # Errors
    ///
    /// Returns `ProvisionError::Timeout` when the backend does not answer in
    /// time, `Rejected` for an `{error}` reply and `Malformed` for an
    /// unreadable one.
    pub async fn provision_next(
        &self,
        session_id: &SessionId,
    ) -> Result<ProvisionedQuestion, ProvisionError> {
        tokio::time::timeout(self.timeout, self.backend.next_question(session_id))
            .await
            .map_err(|_| ProvisionError::Timeout(self.timeout))?
            .map_err(ProvisionError::from)
    }
}
