//! Periodic webcam snapshots.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend::{BackendError, ExamBackend};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use exam_core::Clock;
use exam_core::model::{ActivityKind, JPEG_DATA_URL_PREFIX, SessionId, Snapshot, VideoFrame};
use image::codecs::jpeg::JpegEncoder;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::activity::ActivityReporter;
use crate::camera::{CameraSource, VideoFeed};
use crate::delivery::{Courier, DispatchQueue};
use crate::error::SnapshotError;
use crate::notice::{Notice, Notifier};
use crate::tasks::{SessionTasks, ShutdownSignal};

pub const SNAPSHOT_JPEG_QUALITY: u8 = 50;

const WEBCAM_DENIED_DETAILS: &str = "User denied webcam access";

/// Encodes `frame` as a JPEG data URL.
///
/// # Errors
///
/// Returns `SnapshotError::Encode` if the encoder rejects the frame.
pub fn encode_snapshot(frame: &VideoFrame) -> Result<String, SnapshotError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, SNAPSHOT_JPEG_QUALITY).encode(
        frame.rgb(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgb8.into(),
    )?;
    Ok(format!("{JPEG_DATA_URL_PREFIX}{}", STANDARD.encode(&jpeg)))
}

struct SnapshotCourier {
    backend: Arc<dyn ExamBackend>,
}

#[async_trait]
impl Courier<Snapshot> for SnapshotCourier {
    async fn deliver(&self, snapshot: &Snapshot) -> Result<(), BackendError> {
        self.backend.upload_snapshot(snapshot).await
    }
}

/// Requests camera access once, then uploads one snapshot per interval.
pub struct SnapshotCapturer {
    session_id: SessionId,
    clock: Clock,
    interval: Duration,
    camera: Arc<dyn CameraSource>,
    activity: ActivityReporter,
    notifier: Arc<dyn Notifier>,
}

impl SnapshotCapturer {
    #[must_use]
    pub fn new(
        session_id: SessionId,
        clock: Clock,
        interval: Duration,
        camera: Arc<dyn CameraSource>,
        activity: ActivityReporter,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session_id,
            clock,
            interval,
            camera,
            activity,
            notifier,
        }
    }

    /// Starts the upload queue and the capture task.
    pub fn spawn(self, backend: Arc<dyn ExamBackend>, tasks: &mut SessionTasks) {
        let uploads = DispatchQueue::spawn("snapshots", SnapshotCourier { backend }, tasks);
        let shutdown = tasks.signal();
        tasks.spawn("camera", self.run(uploads, shutdown));
    }

    async fn run(self, uploads: DispatchQueue<Snapshot>, mut shutdown: ShutdownSignal) {
        let access = tokio::select! {
            biased;
            () = shutdown.cancelled() => return,
            access = self.camera.request_access() => access,
        };
        let mut feed = match access {
            Ok(feed) => feed,
            Err(err) => {
                tracing::info!(session_id = %self.session_id, error = %err, "webcam access refused");
                let _ = self
                    .activity
                    .report(ActivityKind::WebcamDenied, WEBCAM_DENIED_DETAILS);
                self.notifier.notify(Notice::WebcamRequired);
                return;
            }
        };
        tracing::info!(session_id = %self.session_id, "webcam access granted");

        let mut ticks = interval_at(Instant::now() + self.interval, self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticks.tick() => {}
            }
            match self.capture(feed.as_mut()) {
                Ok(snapshot) => {
                    let _ = uploads.enqueue(snapshot);
                }
                Err(err) => tracing::debug!(error = %err, "snapshot skipped"),
            }
        }
    }

    fn capture(&self, feed: &mut dyn VideoFeed) -> Result<Snapshot, SnapshotError> {
        let frame = feed.grab_frame()?;
        let image_data = encode_snapshot(&frame)?;
        Ok(Snapshot {
            session_id: self.session_id.clone(),
            captured_at: self.clock.now(),
            image_data,
        })
    }
}
