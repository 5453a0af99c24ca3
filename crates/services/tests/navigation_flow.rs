use std::sync::Arc;
use std::time::Duration;

use backend::{ExamBackend, InMemoryBackend};
use exam_core::model::{
    ActivityKind, Direction, ExamMode, NavigationError, NextControl, Question, QuestionId,
};
use exam_core::time::fixed_clock;
use services::{
    ChannelNotifier, ControllerError, Delivery, EnvironmentSignal, ExamSession, NavigateOutcome,
    Notice, ProvisionError, SessionBootstrap, SessionSettings, SignalDisposition,
};
use tokio::sync::mpsc::UnboundedReceiver;

fn question(id: u64) -> Question {
    Question::new(
        QuestionId::from(id),
        format!("Question text {id}"),
        vec!["alpha".into(), "beta".into(), "gamma".into()],
    )
    .unwrap()
}

fn start(
    mode: ExamMode,
    initial: u64,
    backend: &InMemoryBackend,
) -> (ExamSession, UnboundedReceiver<Notice>) {
    let (notifier, notices) = ChannelNotifier::new();
    let bootstrap =
        SessionBootstrap::new("session-42", mode, (1..=initial).map(question).collect());
    let settings = SessionSettings {
        clock: fixed_clock(),
        ..SessionSettings::default()
    };
    let session = ExamSession::start(
        bootstrap,
        Arc::new(backend.clone()),
        None,
        Arc::new(notifier),
        settings,
    )
    .unwrap();
    (session, notices)
}

#[tokio::test]
async fn fixed_mode_walks_forward_and_stops_at_the_end() {
    let backend = InMemoryBackend::new(3);
    let (session, _notices) = start(ExamMode::Fixed, 3, &backend);
    let controller = session.controller();

    assert_eq!(
        controller.navigate(Direction::Previous).await.unwrap(),
        NavigateOutcome::AtStart
    );
    let first = controller.snapshot().controls();
    assert!(!first.previous_enabled);
    assert_eq!(first.next, NextControl::Advance);
    assert!(!first.submit_visible);

    assert_eq!(
        controller.navigate(Direction::Next).await.unwrap(),
        NavigateOutcome::Moved(2)
    );
    assert_eq!(
        controller.navigate(Direction::Next).await.unwrap(),
        NavigateOutcome::Moved(3)
    );
    assert_eq!(
        controller.navigate(Direction::Next).await.unwrap(),
        NavigateOutcome::AtEnd
    );

    let last = controller.snapshot();
    assert_eq!(last.current_index(), 3);
    assert_eq!(last.controls().next, NextControl::Hidden);
    assert!(last.controls().submit_visible);
    assert!(last.controls().previous_enabled);
    assert_eq!(backend.next_question_calls(), 0);
}

#[tokio::test]
async fn overlapping_advances_issue_a_single_provisioning_request() {
    let backend = InMemoryBackend::new(1).with_question_bank([question(2), question(3)]);
    backend.hold_next_question(true);
    let (session, _notices) = start(ExamMode::Endless, 1, &backend);

    let controller = session.controller().clone();
    let first = tokio::spawn(async move { controller.navigate(Direction::Next).await });
    while backend.next_question_calls() == 0 {
        tokio::task::yield_now().await;
    }

    let controller = session.controller();
    assert_eq!(
        controller.navigate(Direction::Next).await.unwrap(),
        NavigateOutcome::Busy
    );
    assert_eq!(
        controller.navigate(Direction::Previous).await.unwrap(),
        NavigateOutcome::Busy
    );
    assert_eq!(controller.jump_to(1).unwrap_err(), NavigationError::Busy);
    let loading = controller.snapshot().controls();
    assert_eq!(loading.next, NextControl::Loading);
    assert!(!loading.previous_enabled);

    backend.release_next_question(1);
    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome, NavigateOutcome::Provisioned(2));
    assert_eq!(backend.next_question_calls(), 1);

    let state = controller.snapshot();
    assert_eq!(state.total_known(), 2);
    assert_eq!(state.current_index(), 2);
    assert_eq!(state.current_question().unwrap().id(), &QuestionId::from(2));
    assert_eq!(state.controls().next, NextControl::Fetch);
    assert!(state.controls().submit_visible);
}

#[tokio::test]
async fn answers_and_signals_are_taken_while_a_question_loads() {
    let backend = InMemoryBackend::new(1).with_question_bank([question(2)]);
    backend.hold_next_question(true);
    let (session, _notices) = start(ExamMode::Endless, 1, &backend);

    let controller = session.controller().clone();
    let advance = tokio::spawn(async move { controller.navigate(Direction::Next).await });
    while backend.next_question_calls() == 0 {
        tokio::task::yield_now().await;
    }

    let receipt = session.controller().select_answer(1, "beta").unwrap();
    assert_eq!(receipt.outcome().await, Delivery::Confirmed);
    assert_eq!(
        session.monitor().observe(EnvironmentSignal::Hidden),
        SignalDisposition::Logged(ActivityKind::TabSwitch)
    );
    let loading = session.controller().snapshot();
    assert!(loading.is_answered(1));
    assert_eq!(loading.controls().next, NextControl::Loading);

    backend.release_next_question(1);
    assert_eq!(
        advance.await.unwrap().unwrap(),
        NavigateOutcome::Provisioned(2)
    );
}

#[tokio::test]
async fn rejected_provisioning_leaves_state_and_notifies() {
    let backend = InMemoryBackend::new(2);
    backend.fail_next_question("Not an endless session");
    let (session, mut notices) = start(ExamMode::Endless, 2, &backend);
    let controller = session.controller();
    controller.jump_to(2).unwrap();

    let err = controller.navigate(Direction::Next).await.unwrap_err();
    assert!(matches!(
        &err,
        ControllerError::Provision(ProvisionError::Rejected(msg)) if msg == "Not an endless session"
    ));

    let state = controller.snapshot();
    assert_eq!(state.total_known(), 2);
    assert_eq!(state.current_index(), 2);
    assert!(!state.is_provisioning());
    assert_eq!(state.controls().next, NextControl::Fetch);
    assert_eq!(
        notices.try_recv().unwrap().message(),
        "Error loading question: Not an endless session"
    );
}

#[tokio::test]
async fn server_ahead_of_the_client_still_advances() {
    let backend =
        InMemoryBackend::new(1).with_question_bank([question(2), question(3), question(4)]);
    let (session, _notices) = start(ExamMode::Endless, 1, &backend);
    let controller = session.controller();

    // The server commits a question whose reply never reaches the client.
    backend.next_question(controller.session().id()).await.unwrap();

    assert_eq!(
        controller.navigate(Direction::Next).await.unwrap(),
        NavigateOutcome::Provisioned(2)
    );
    let state = controller.snapshot();
    assert_eq!(state.total_known(), 2);
    assert_eq!(state.reported_total(), 3);
    assert_eq!(state.display_number(2), Some(3));
    assert_eq!(state.current_question().unwrap().id(), &QuestionId::from(3));

    assert_eq!(
        controller.navigate(Direction::Next).await.unwrap(),
        NavigateOutcome::Provisioned(3)
    );
    assert_eq!(controller.snapshot().display_number(3), Some(4));
    assert_eq!(backend.next_question_calls(), 3);
}

#[tokio::test]
async fn total_that_does_not_advance_is_a_provisioning_failure() {
    let backend = InMemoryBackend::new(1).with_question_bank([question(2)]);
    backend.override_reported_total(Some(1));
    let (session, mut notices) = start(ExamMode::Endless, 1, &backend);

    let err = session
        .controller()
        .navigate(Direction::Next)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Provision(ProvisionError::Navigation(NavigationError::StaleTotal {
            known: 1,
            reported: 1
        }))
    ));
    let state = session.controller().snapshot();
    assert_eq!(state.total_known(), 1);
    assert!(!state.is_provisioning());
    assert!(matches!(
        notices.try_recv().unwrap(),
        Notice::QuestionLoadFailed(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn unanswered_provisioning_times_out_and_reopens_the_gate() {
    let backend = InMemoryBackend::new(1).with_question_bank([question(2)]);
    backend.hold_next_question(true);
    let (session, _notices) = start(ExamMode::Endless, 1, &backend);

    let err = session
        .controller()
        .navigate(Direction::Next)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Provision(ProvisionError::Timeout(timeout)) if timeout == Duration::from_secs(10)
    ));
    let state = session.controller().snapshot();
    assert!(!state.is_provisioning());
    assert_eq!(state.total_known(), 1);
}

#[tokio::test]
async fn answered_mark_follows_confirmed_saves_only() {
    let backend = InMemoryBackend::new(2);
    let (session, _notices) = start(ExamMode::Fixed, 2, &backend);
    let controller = session.controller();

    let receipt = controller.select_answer(1, "beta").unwrap();
    assert_eq!(receipt.outcome().await, Delivery::Confirmed);
    assert!(controller.snapshot().is_answered(1));

    backend.fail_saves(true);
    let receipt = controller.select_answer(2, "alpha").unwrap();
    assert!(matches!(receipt.outcome().await, Delivery::Dropped(_)));
    let state = controller.snapshot();
    assert!(!state.is_answered(2));
    assert_eq!(state.selected(2), Some("alpha"));

    assert!(matches!(
        controller.select_answer(2, "delta"),
        Err(NavigationError::UnknownOption { number: 2, .. })
    ));
}

#[tokio::test]
async fn quick_reselection_reaches_backend_in_order() {
    let backend = InMemoryBackend::new(1);
    let (session, _notices) = start(ExamMode::Fixed, 1, &backend);
    let controller = session.controller();

    let _first = controller.select_answer(1, "alpha").unwrap();
    let second = controller.select_answer(1, "gamma").unwrap();
    second.outcome().await;

    let saved: Vec<_> = backend
        .answers()
        .into_iter()
        .map(|record| record.selected_answer)
        .collect();
    assert_eq!(saved, vec!["alpha".to_string(), "gamma".to_string()]);
    assert_eq!(controller.snapshot().selected(1), Some("gamma"));
}

#[tokio::test]
async fn submit_is_offered_at_the_last_question_and_ends_the_session() {
    let backend = InMemoryBackend::new(2);
    let (mut session, _notices) = start(ExamMode::Fixed, 2, &backend);

    assert!(matches!(
        session.submit().await,
        Err(ControllerError::Navigation(
            NavigationError::SubmitUnavailable { current: 1 }
        ))
    ));
    assert!(!session.is_ended());

    session.controller().jump_to(2).unwrap();
    session.submit().await.unwrap();
    assert_eq!(backend.submissions().len(), 1);
    assert!(session.is_ended());
    assert_eq!(session.running_tasks(), 0);

    assert!(matches!(
        session.submit().await,
        Err(ControllerError::SessionEnded)
    ));
}
