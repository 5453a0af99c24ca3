//! User-facing notices raised by background components.

use std::fmt;

use tokio::sync::mpsc;

/// Something the user must be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notice {
    /// Provisioning failed; carries the failure message.
    QuestionLoadFailed(String),
    WebcamRequired,
    TabSwitchWarning,
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::QuestionLoadFailed(reason) => format!("Error loading question: {reason}"),
            Self::WebcamRequired => {
                "Webcam access is required for this exam. Please enable it.".to_string()
            }
            Self::TabSwitchWarning => {
                "Warning: Tab switching is monitored and recorded!".to_string()
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Surface for notices; the embedding UI decides how to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("notice receiver gone; notice dropped");
        }
    }
}
