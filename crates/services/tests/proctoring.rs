use std::sync::Arc;
use std::time::Duration;

use backend::InMemoryBackend;
use exam_core::model::{ActivityKind, ExamMode, JPEG_DATA_URL_PREFIX, Question, QuestionId};
use exam_core::time::fixed_clock;
use services::{
    CameraSource, ChannelNotifier, DeniedCamera, EnvironmentSignal, ExamSession, Notice,
    SessionBootstrap, SessionSettings, SignalDisposition, SyntheticCamera,
};
use tokio::sync::mpsc::UnboundedReceiver;

fn start(
    backend: &InMemoryBackend,
    camera: Option<Arc<dyn CameraSource>>,
) -> (ExamSession, UnboundedReceiver<Notice>) {
    let (notifier, notices) = ChannelNotifier::new();
    let question = Question::new(QuestionId::from(1), "Only question", vec!["yes".into()]).unwrap();
    let bootstrap = SessionBootstrap::new("proctored", ExamMode::Fixed, vec![question]);
    let settings = SessionSettings {
        clock: fixed_clock(),
        ..SessionSettings::default()
    };
    let session = ExamSession::start(
        bootstrap,
        Arc::new(backend.clone()),
        camera,
        Arc::new(notifier),
        settings,
    )
    .unwrap();
    (session, notices)
}

#[tokio::test(start_paused = true)]
async fn first_snapshot_arrives_one_interval_after_grant() {
    let backend = InMemoryBackend::new(1);
    let (session, mut notices) = start(&backend, Some(Arc::new(SyntheticCamera::new(16, 12))));

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(backend.snapshots().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.snapshots().len(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    let snapshots = backend.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert!(snapshots[0].image_data.starts_with(JPEG_DATA_URL_PREFIX));
    assert_eq!(snapshots[0].session_id.as_str(), "proctored");

    assert!(backend.activity().is_empty());
    assert!(notices.try_recv().is_err());

    session.shutdown().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.snapshots().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn denied_camera_reports_once_and_warns() {
    let backend = InMemoryBackend::new(1);
    let (_session, mut notices) = start(&backend, Some(Arc::new(DeniedCamera)));

    tokio::time::sleep(Duration::from_secs(90)).await;

    let activity = backend.activity();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].kind, ActivityKind::WebcamDenied);
    assert_eq!(activity[0].details, "User denied webcam access");
    assert!(backend.snapshots().is_empty());
    assert_eq!(notices.try_recv().unwrap(), Notice::WebcamRequired);
}

#[tokio::test(start_paused = true)]
async fn missing_camera_produces_no_telemetry() {
    let backend = InMemoryBackend::new(1);
    let (_session, mut notices) = start(&backend, None);

    tokio::time::sleep(Duration::from_secs(90)).await;

    assert!(backend.snapshots().is_empty());
    assert!(backend.activity().is_empty());
    assert!(notices.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn every_visibility_transition_is_reported() {
    let backend = InMemoryBackend::new(1);
    let (session, mut notices) = start(&backend, None);
    let monitor = session.monitor();

    for _ in 0..3 {
        monitor.observe(EnvironmentSignal::Hidden);
        monitor.observe(EnvironmentSignal::Visible);
    }
    assert_eq!(
        monitor.observe(EnvironmentSignal::Copy),
        SignalDisposition::Suppressed
    );
    tokio::time::sleep(Duration::from_millis(10)).await;

    let kinds: Vec<_> = backend.activity().into_iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![ActivityKind::TabSwitch; 3]);
    for _ in 0..3 {
        assert_eq!(notices.try_recv().unwrap(), Notice::TabSwitchWarning);
    }
}

#[tokio::test(start_paused = true)]
async fn telemetry_failures_do_not_disturb_the_exam() {
    let backend = InMemoryBackend::new(1);
    backend.fail_telemetry(true);
    let (session, _notices) = start(&backend, Some(Arc::new(SyntheticCamera::new(8, 8))));

    session.monitor().observe(EnvironmentSignal::Blur);
    tokio::time::sleep(Duration::from_millis(61_500)).await;

    assert!(backend.activity().is_empty());
    assert!(backend.snapshots().is_empty());
    assert_eq!(session.elapsed_label(), "00:01:01");
    assert!(session.controller().snapshot().controls().submit_visible);
}
