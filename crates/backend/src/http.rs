use std::time::Duration;

use async_trait::async_trait;
use exam_core::model::{ActivityEvent, AnswerRecord, SessionId, Snapshot};
use reqwest::{Client, Response};
use serde::Serialize;
use url::Url;

use crate::api::{ExamBackend, ProvisionedQuestion};
use crate::csrf::CSRF_HEADER;
use crate::error::BackendError;
use crate::wire::{
    self, LogActivityRequest, NextQuestionReply, NextQuestionRequest, SaveAnswerRequest,
    UploadSnapshotRequest,
};

/// JSON-over-HTTP backend.
///
/// Every request carries the CSRF token (when one is known) and is bounded by
/// the client-wide timeout.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    csrf_token: Option<String>,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `BackendError::Endpoint` if `base_url` cannot be a base, or
    /// `BackendError::Http` if the client cannot be built.
    pub fn new(
        mut base_url: Url,
        csrf_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Endpoint(base_url.to_string()));
        }
        // Relative joins must not drop the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            csrf_token,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|err| BackendError::Endpoint(format!("{path}: {err}")))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, BackendError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await.map_err(BackendError::from_transport)?;
        tracing::debug!(path, status = response.status().as_u16(), "backend response");
        Ok(response)
    }

    async fn post_expecting_success<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        let response = self.post(path, body).await?;
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl ExamBackend for HttpBackend {
    async fn next_question(
        &self,
        session_id: &SessionId,
    ) -> Result<ProvisionedQuestion, BackendError> {
        let response = self
            .post(wire::NEXT_QUESTION_PATH, &NextQuestionRequest { session_id })
            .await?;
        let status = response.status();
        let body = response.bytes().await.map_err(BackendError::from_transport)?;

        // An `{error}` body is meaningful at any status.
        match serde_json::from_slice::<NextQuestionReply>(&body) {
            Ok(reply @ NextQuestionReply::Failure { .. }) => reply.into_provisioned(),
            Ok(reply) if status.is_success() => reply.into_provisioned(),
            Ok(_) => Err(BackendError::Status(status.as_u16())),
            Err(_) if !status.is_success() => Err(BackendError::Status(status.as_u16())),
            Err(err) => Err(BackendError::Decode(err.to_string())),
        }
    }

    async fn save_answer(&self, record: &AnswerRecord) -> Result<(), BackendError> {
        self.post_expecting_success(wire::SAVE_ANSWER_PATH, &SaveAnswerRequest::from(record))
            .await
    }

    async fn upload_snapshot(&self, snapshot: &Snapshot) -> Result<(), BackendError> {
        self.post_expecting_success(
            wire::UPLOAD_SNAPSHOT_PATH,
            &UploadSnapshotRequest::from(snapshot),
        )
        .await
    }

    async fn log_activity(&self, event: &ActivityEvent) -> Result<(), BackendError> {
        self.post_expecting_success(wire::LOG_ACTIVITY_PATH, &LogActivityRequest::from(event))
            .await
    }

    async fn submit_exam(&self, session_id: &SessionId) -> Result<(), BackendError> {
        self.post_expecting_success(&wire::submit_path(session_id), &serde_json::json!({}))
            .await
    }
}
