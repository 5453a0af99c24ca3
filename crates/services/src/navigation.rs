//! The navigation state machine and its side effects.

use std::sync::Arc;

use backend::ExamBackend;
use exam_core::model::{Direction, NavigationError, NavigationState, Session, StepTarget};

use crate::answers::AnswerStore;
use crate::delivery::DeliveryReceipt;
use crate::error::{ControllerError, ProvisionError};
use crate::notice::{Notice, Notifier};
use crate::provisioner::QuestionProvisioner;
use crate::state::SharedNavigation;
use crate::tasks::Canceller;

/// Result of a relative navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// Moved to an already materialized question.
    Moved(usize),
    /// Fetched a new question and moved to it.
    Provisioned(usize),
    AtStart,
    /// Fixed mode, past the last question.
    AtEnd,
    /// A question is being loaded; the intent was ignored.
    Busy,
}

enum Step {
    Done(NavigateOutcome),
    Provision,
}

/// Owns the visible question and every navigation affordance.
///
/// Only one provisioning request may be outstanding: while it is in flight
/// every navigation intent resolves to `Busy`.
#[derive(Clone)]
pub struct NavigationController {
    session: Session,
    state: SharedNavigation,
    provisioner: QuestionProvisioner,
    answers: AnswerStore,
    backend: Arc<dyn ExamBackend>,
    notifier: Arc<dyn Notifier>,
    canceller: Canceller,
}

impl NavigationController {
    #[must_use]
    pub fn new(
        session: Session,
        state: SharedNavigation,
        provisioner: QuestionProvisioner,
        answers: AnswerStore,
        backend: Arc<dyn ExamBackend>,
        notifier: Arc<dyn Notifier>,
        canceller: Canceller,
    ) -> Self {
        Self {
            session,
            state,
            provisioner,
            answers,
            backend,
            notifier,
            canceller,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Steps one question back or forward, fetching a new one in endless mode.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Provision` when fetching fails. The state is
    /// left as it was and the user is notified.
    pub async fn navigate(&self, direction: Direction) -> Result<NavigateOutcome, ControllerError> {
        let step = self.state.update(|nav| -> Result<Step, NavigationError> {
            if nav.is_provisioning() {
                return Ok(Step::Done(NavigateOutcome::Busy));
            }
            match nav.step_target(direction) {
                StepTarget::BeforeStart => Ok(Step::Done(NavigateOutcome::AtStart)),
                StepTarget::Within(number) => {
                    nav.jump_to(number)?;
                    Ok(Step::Done(NavigateOutcome::Moved(number)))
                }
                StepTarget::BeyondEnd if !nav.mode().is_endless() => {
                    Ok(Step::Done(NavigateOutcome::AtEnd))
                }
                StepTarget::BeyondEnd => {
                    nav.begin_provisioning()?;
                    Ok(Step::Provision)
                }
            }
        })?;

        match step {
            Step::Done(outcome) => Ok(outcome),
            Step::Provision => self.provision().await,
        }
    }

    async fn provision(&self) -> Result<NavigateOutcome, ControllerError> {
        let gate = ProvisioningGate::new(self.state.clone());
        let session_id = self.session.id();
        tracing::debug!(session_id = %session_id, "requesting next question");

        let result = match self.provisioner.provision_next(session_id).await {
            Ok(provisioned) => gate
                .complete(|nav| {
                    nav.complete_provisioning(provisioned.question, provisioned.total_questions)
                })
                .map_err(ProvisionError::from),
            Err(err) => {
                drop(gate);
                Err(err)
            }
        };

        match result {
            Ok(number) => {
                tracing::info!(session_id = %session_id, number, "question provisioned");
                Ok(NavigateOutcome::Provisioned(number))
            }
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "question provisioning failed");
                self.notifier.notify(Notice::QuestionLoadFailed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `NavigationError::Busy` while a question is being loaded and
    /// `NavigationError::OutOfRange` when `number` is not materialized.
    pub fn jump_to(&self, number: usize) -> Result<(), NavigationError> {
        self.state.update(|nav| nav.jump_to(number))
    }

    /// Records `option` for question `number` and hands the write to the
    /// answer store.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` when the question or option is unknown.
    pub fn select_answer(
        &self,
        number: usize,
        option: &str,
    ) -> Result<DeliveryReceipt, NavigationError> {
        let question_id = self.state.update(|nav| nav.select(number, option))?;
        Ok(self.answers.save(number, question_id, option))
    }

    /// Owned view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> NavigationState {
        self.state.snapshot()
    }

    /// Submits the exam and ends the session, whatever the backend answers.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::SubmitUnavailable` away from the last
    /// question, `ControllerError::SessionEnded` after a previous submission
    /// and `ControllerError::Submit` when the backend refuses.
    pub async fn submit(&self) -> Result<(), ControllerError> {
        if self.canceller.is_cancelled() {
            return Err(ControllerError::SessionEnded);
        }
        self.state.read(|nav| {
            if nav.can_submit() {
                Ok(())
            } else {
                Err(NavigationError::SubmitUnavailable {
                    current: nav.current_index(),
                })
            }
        })?;

        let session_id = self.session.id();
        let result = self.backend.submit_exam(session_id).await;
        self.canceller.cancel();
        match result {
            Ok(()) => {
                tracing::info!(session_id = %session_id, "exam submitted");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "exam submission failed");
                Err(ControllerError::Submit(err))
            }
        }
    }
}

/// Reopens the provisioning gate if the request is abandoned.
struct ProvisioningGate {
    state: SharedNavigation,
    open: bool,
}

impl ProvisioningGate {
    fn new(state: SharedNavigation) -> Self {
        Self { state, open: false }
    }

    fn complete<R>(mut self, f: impl FnOnce(&mut NavigationState) -> R) -> R {
        self.open = true;
        self.state.update(f)
    }
}

impl Drop for ProvisioningGate {
    fn drop(&mut self) {
        if !self.open {
            self.state.update(NavigationState::abort_provisioning);
        }
    }
}
