//! Shared error types for the services crate.

use std::time::Duration;

use backend::BackendError;
use exam_core::model::{FrameError, NavigationError, ParseIdError};
use thiserror::Error;

/// Errors emitted while fetching one more question.
///
/// `Display` is the message shown to the user after `Error loading question: `.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProvisionError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for ProvisionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected(message) => Self::Rejected(message),
            BackendError::Decode(message) => Self::Malformed(message),
            other => Self::Backend(other),
        }
    }
}

/// Errors emitted by `NavigationController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("Error loading question: {0}")]
    Provision(#[from] ProvisionError),
    #[error("exam submission failed: {0}")]
    Submit(#[source] BackendError),
    #[error("the exam session has ended")]
    SessionEnded,
}

/// Errors emitted while starting an exam session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    #[error(transparent)]
    SessionId(#[from] ParseIdError),
    #[error("declared {declared} questions but received {actual}")]
    TotalMismatch { declared: usize, actual: usize },
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Errors emitted while reading `ExamConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid base url {value:?}: {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    Seconds { key: &'static str, value: String },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by a camera capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CameraError {
    #[error("camera access denied")]
    Denied,
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while turning a frame into an uploadable snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("jpeg encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
