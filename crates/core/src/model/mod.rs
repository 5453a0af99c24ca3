mod activity;
mod answer;
mod ids;
mod navigation;
mod question;
mod session;
mod snapshot;

pub use ids::{ParseIdError, QuestionId, SessionId};

pub use activity::{ActivityEvent, ActivityKind};
pub use answer::AnswerRecord;
pub use navigation::{
    ControlState, Direction, NavigationError, NavigationState, NextControl, StepTarget,
};
pub use question::{Question, QuestionError, QuestionSet};
pub use session::{ExamMode, ParseModeError, Session};
pub use snapshot::{FrameError, JPEG_DATA_URL_PREFIX, Snapshot, VideoFrame};
