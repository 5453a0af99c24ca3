//! Session start-up: validates the page's inputs and wires the components.

use std::sync::Arc;

use backend::ExamBackend;
use exam_core::format_hms;
use exam_core::model::{ExamMode, NavigationState, Question, QuestionSet, Session, SessionId};
use tokio::sync::watch;

use crate::activity::ActivityReporter;
use crate::answers::AnswerStore;
use crate::camera::CameraSource;
use crate::config::SessionSettings;
use crate::error::{BootstrapError, ControllerError};
use crate::integrity::IntegrityMonitor;
use crate::navigation::NavigationController;
use crate::notice::Notifier;
use crate::provisioner::QuestionProvisioner;
use crate::snapshot::SnapshotCapturer;
use crate::state::SharedNavigation;
use crate::tasks::SessionTasks;
use crate::timer::spawn_timer;

/// Inputs the surrounding page supplies at load time.
#[derive(Debug, Clone)]
pub struct SessionBootstrap {
    pub session_id: String,
    pub mode: ExamMode,
    pub questions: Vec<Question>,
    /// Initial total the page declares; must match `questions`.
    pub declared_total: usize,
}

impl SessionBootstrap {
    #[must_use]
    pub fn new(session_id: impl Into<String>, mode: ExamMode, questions: Vec<Question>) -> Self {
        let declared_total = questions.len();
        Self {
            session_id: session_id.into(),
            mode,
            questions,
            declared_total,
        }
    }

    #[must_use]
    pub fn with_declared_total(mut self, total: usize) -> Self {
        self.declared_total = total;
        self
    }

    /// # Errors
    ///
    /// Returns `BootstrapError` for a blank session id, an empty question
    /// list or a declared total that disagrees with the list.
    pub fn validate(self) -> Result<(Session, NavigationState), BootstrapError> {
        let id = SessionId::new(self.session_id)?;
        if self.declared_total != self.questions.len() {
            return Err(BootstrapError::TotalMismatch {
                declared: self.declared_total,
                actual: self.questions.len(),
            });
        }
        let state = NavigationState::new(self.mode, QuestionSet::new(self.questions))?;
        Ok((Session::new(id, self.mode), state))
    }
}

/// A running exam session and its background tasks.
pub struct ExamSession {
    controller: NavigationController,
    monitor: IntegrityMonitor,
    elapsed: watch::Receiver<u64>,
    tasks: SessionTasks,
}

impl ExamSession {
    /// Validates `bootstrap` and starts the timer, the telemetry queues, the
    /// answer queue and, when a camera exists, the snapshot capture.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` when the inputs are invalid.
    pub fn start(
        bootstrap: SessionBootstrap,
        backend: Arc<dyn ExamBackend>,
        camera: Option<Arc<dyn CameraSource>>,
        notifier: Arc<dyn Notifier>,
        settings: SessionSettings,
    ) -> Result<Self, BootstrapError> {
        let (session, state) = bootstrap.validate()?;
        let question_count = state.total_known();
        let state = SharedNavigation::new(state);
        let mut tasks = SessionTasks::new();

        let elapsed = spawn_timer(settings.timer_tick, &mut tasks);
        let activity = ActivityReporter::spawn(
            Arc::clone(&backend),
            session.id().clone(),
            settings.clock,
            &mut tasks,
        );
        let answers = AnswerStore::spawn(
            Arc::clone(&backend),
            session.id().clone(),
            state.clone(),
            &mut tasks,
        );
        match camera {
            Some(camera) => SnapshotCapturer::new(
                session.id().clone(),
                settings.clock,
                settings.snapshot_interval,
                camera,
                activity.clone(),
                Arc::clone(&notifier),
            )
            .spawn(Arc::clone(&backend), &mut tasks),
            None => {
                tracing::info!(session_id = %session.id(), "no camera available; snapshots disabled");
            }
        }

        let monitor = IntegrityMonitor::new(activity, Arc::clone(&notifier));
        let controller = NavigationController::new(
            session.clone(),
            state,
            QuestionProvisioner::new(Arc::clone(&backend), settings.provision_timeout),
            answers,
            backend,
            notifier,
            tasks.canceller(),
        );

        tracing::info!(
            session_id = %session.id(),
            mode = %session.mode(),
            questions = question_count,
            "exam session started"
        );
        Ok(Self {
            controller,
            monitor,
            elapsed,
            tasks,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.controller.session()
    }

    #[must_use]
    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    #[must_use]
    pub fn monitor(&self) -> &IntegrityMonitor {
        &self.monitor
    }

    #[must_use]
    pub fn elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.clone()
    }

    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format_hms(*self.elapsed.borrow())
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.tasks.is_cancelled()
    }

    /// Submits the exam, then waits for the background tasks to stop.
    ///
    /// # Errors
    ///
    /// See `NavigationController::submit`.
    pub async fn submit(&mut self) -> Result<(), ControllerError> {
        let result = self.controller.submit().await;
        if self.tasks.is_cancelled() {
            self.tasks.shutdown().await;
        }
        result
    }

    /// Stops every background task.
    pub async fn shutdown(mut self) {
        self.tasks.shutdown().await;
        tracing::info!(session_id = %self.session().id(), "exam session closed");
    }

    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.tasks.running()
    }
}
