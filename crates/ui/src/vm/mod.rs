mod exam_vm;
mod intent;

pub use exam_vm::{ControlsVm, ExamVm, NavButtonVm, NextButtonVm, OptionVm, QuestionPanelVm};
pub use intent::{ExamIntent, parse_intent};
