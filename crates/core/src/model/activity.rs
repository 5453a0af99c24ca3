use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::model::SessionId;

/// Kind of integrity-relevant activity reported to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ActivityKind {
    WebcamDenied,
    TabSwitch,
    FocusLost,
    /// Any kind the backend accepts that the client has no dedicated variant for.
    Other(String),
}

impl ActivityKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::WebcamDenied => "webcam_denied",
            Self::TabSwitch => "tab_switch",
            Self::FocusLost => "focus_lost",
            Self::Other(kind) => kind,
        }
    }
}

impl From<&str> for ActivityKind {
    fn from(value: &str) -> Self {
        match value {
            "webcam_denied" => Self::WebcamDenied,
            "tab_switch" => Self::TabSwitch,
            "focus_lost" => Self::FocusLost,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActivityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One integrity event. The backend stamps its own receive time; the client
/// keeps `occurred_at` for local diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub session_id: SessionId,
    pub kind: ActivityKind,
    pub details: String,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    #[must_use]
    pub fn new(
        session_id: SessionId,
        kind: ActivityKind,
        details: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            kind,
            details: details.into(),
            occurred_at,
        }
    }
}
