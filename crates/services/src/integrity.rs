//! Classification of environment signals that matter for exam integrity.

use std::sync::Arc;

use exam_core::model::ActivityKind;

use crate::activity::ActivityReporter;
use crate::notice::{Notice, Notifier};

/// An environment change observed by the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentSignal {
    /// The exam view was hidden (tab switch, minimize).
    Hidden,
    Visible,
    /// The window lost focus.
    Blur,
    Focus,
    Copy,
    Cut,
    Paste,
    ContextMenu,
}

/// What the monitor did with a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalDisposition {
    /// An event of this kind was emitted.
    Logged(ActivityKind),
    /// The caller must cancel the signal's default action. Nothing is logged.
    Suppressed,
    Ignored,
}

impl SignalDisposition {
    #[must_use]
    pub fn blocks_default(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

const TAB_SWITCH_DETAILS: &str = "User switched tabs or minimized window";
const FOCUS_LOST_DETAILS: &str = "Window lost focus";

/// Turns environment signals into activity events and warnings.
///
/// Every transition is reported; nothing is debounced.
#[derive(Clone)]
pub struct IntegrityMonitor {
    reporter: ActivityReporter,
    notifier: Arc<dyn Notifier>,
}

impl IntegrityMonitor {
    #[must_use]
    pub fn new(reporter: ActivityReporter, notifier: Arc<dyn Notifier>) -> Self {
        Self { reporter, notifier }
    }

    pub fn observe(&self, signal: EnvironmentSignal) -> SignalDisposition {
        match signal {
            EnvironmentSignal::Hidden => {
                let _ = self.reporter.report(ActivityKind::TabSwitch, TAB_SWITCH_DETAILS);
                self.notifier.notify(Notice::TabSwitchWarning);
                SignalDisposition::Logged(ActivityKind::TabSwitch)
            }
            EnvironmentSignal::Blur => {
                let _ = self.reporter.report(ActivityKind::FocusLost, FOCUS_LOST_DETAILS);
                SignalDisposition::Logged(ActivityKind::FocusLost)
            }
            EnvironmentSignal::Copy
            | EnvironmentSignal::Cut
            | EnvironmentSignal::Paste
            | EnvironmentSignal::ContextMenu => SignalDisposition::Suppressed,
            EnvironmentSignal::Visible | EnvironmentSignal::Focus => SignalDisposition::Ignored,
        }
    }
}
