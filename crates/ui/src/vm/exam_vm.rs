use exam_core::format_hms;
use exam_core::model::{NavigationState, NextControl};
use services::Notice;

/// One selectable option of a question panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionPanelVm {
    /// Position in the session.
    pub number: usize,
    pub title: String,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub visible: bool,
}

/// Entry of the question navigator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavButtonVm {
    pub number: usize,
    /// Number shown to the user; may skip ahead of `number`.
    pub label: usize,
    pub active: bool,
    pub answered: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextButtonVm {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlsVm {
    pub previous_enabled: bool,
    /// `None` when the next control is hidden.
    pub next: Option<NextButtonVm>,
    pub submit_visible: bool,
}

/// Everything the exam page shows, derived from state alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamVm {
    pub panels: Vec<QuestionPanelVm>,
    pub nav: Vec<NavButtonVm>,
    pub controls: ControlsVm,
    pub timer_label: String,
    pub notices: Vec<String>,
}

impl ExamVm {
    #[must_use]
    pub fn project(state: &NavigationState, elapsed_seconds: u64, notices: &[Notice]) -> Self {
        let current = state.current_index();
        let panels = state
            .questions()
            .iter()
            .map(|(number, question)| {
                let selected = state.selected(number);
                let label = state.display_number(number).unwrap_or(number);
                QuestionPanelVm {
                    number,
                    title: format!("Question {label}"),
                    text: question.text().to_owned(),
                    options: question
                        .options()
                        .iter()
                        .map(|option| OptionVm {
                            label: option.clone(),
                            selected: selected == Some(option.as_str()),
                        })
                        .collect(),
                    visible: number == current,
                }
            })
            .collect();
        let nav = (1..=state.total_known())
            .map(|number| NavButtonVm {
                number,
                label: state.display_number(number).unwrap_or(number),
                active: number == current,
                answered: state.is_answered(number),
            })
            .collect();

        Self {
            panels,
            nav,
            controls: controls_vm(state),
            timer_label: format_hms(elapsed_seconds),
            notices: notices.iter().map(Notice::message).collect(),
        }
    }

    #[must_use]
    pub fn visible_panel(&self) -> Option<&QuestionPanelVm> {
        self.panels.iter().find(|panel| panel.visible)
    }
}

fn controls_vm(state: &NavigationState) -> ControlsVm {
    let controls = state.controls();
    let next = match controls.next {
        NextControl::Hidden => None,
        NextControl::Advance => Some(NextButtonVm {
            label: "Next",
            enabled: true,
        }),
        NextControl::Fetch => Some(NextButtonVm {
            label: "Next Question",
            enabled: true,
        }),
        NextControl::Loading => Some(NextButtonVm {
            label: "Loading...",
            enabled: false,
        }),
    };
    ControlsVm {
        previous_enabled: controls.previous_enabled,
        next,
        submit_visible: controls.submit_visible,
    }
}
