#![forbid(unsafe_code)]

pub mod activity;
pub mod answers;
pub mod bootstrap;
pub mod camera;
pub mod config;
pub mod delivery;
pub mod error;
pub mod integrity;
pub mod navigation;
pub mod notice;
pub mod provisioner;
pub mod snapshot;
pub mod state;
pub mod tasks;
pub mod timer;

pub use exam_core::Clock;

pub use activity::ActivityReporter;
pub use answers::AnswerStore;
pub use bootstrap::{ExamSession, SessionBootstrap};
pub use camera::{CameraSource, DeniedCamera, SyntheticCamera, VideoFeed};
pub use config::{ExamConfig, SessionSettings};
pub use delivery::{Delivery, DeliveryReceipt};
pub use error::{
    BootstrapError, CameraError, ConfigError, ControllerError, ProvisionError, SnapshotError,
};
pub use integrity::{EnvironmentSignal, IntegrityMonitor, SignalDisposition};
pub use navigation::{NavigateOutcome, NavigationController};
pub use notice::{ChannelNotifier, Notice, Notifier};
pub use provisioner::QuestionProvisioner;
pub use snapshot::{SnapshotCapturer, encode_snapshot};
pub use state::SharedNavigation;
pub use tasks::{Canceller, SessionTasks, ShutdownSignal};
