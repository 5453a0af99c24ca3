use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::SessionId;

/// How the question set behaves once the user reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamMode {
    /// The question set is known upfront; the last question offers submission only.
    Fixed,
    /// Advancing past the last known question provisions one more from the backend.
    Endless,
}

impl ExamMode {
    /// Maps the page's `is-endless` flag onto a mode.
    #[must_use]
    pub fn from_endless_flag(flag: &str) -> Self {
        if flag.trim() == "true" {
            Self::Endless
        } else {
            Self::Fixed
        }
    }

    #[must_use]
    pub fn is_endless(self) -> bool {
        matches!(self, Self::Endless)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Endless => "endless",
        }
    }
}

impl fmt::Display for ExamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown exam mode: {raw}")]
pub struct ParseModeError {
    raw: String,
}

impl FromStr for ExamMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "normal" => Ok(Self::Fixed),
            "endless" => Ok(Self::Endless),
            _ => Err(ParseModeError { raw: s.to_owned() }),
        }
    }
}

/// Session identity, fixed at bootstrap and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    mode: ExamMode,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId, mode: ExamMode) -> Self {
        Self { id, mode }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }
}
