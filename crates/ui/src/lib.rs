pub mod views;
pub mod vm;

pub use views::{ViewError, render_text};
pub use vm::{ExamIntent, ExamVm, parse_intent};
