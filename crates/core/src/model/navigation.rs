use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{ExamMode, Question, QuestionId, QuestionSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("a session needs at least one question")]
    EmptyQuestionSet,

    #[error("question {requested} is outside 1..={total}")]
    OutOfRange { requested: usize, total: usize },

    #[error("a question is being loaded")]
    Busy,

    #[error("server reported {reported} questions, but {known} are already known")]
    StaleTotal { known: usize, reported: usize },

    #[error("option {option:?} does not belong to question {number}")]
    UnknownOption { number: usize, option: String },

    #[error("submission is not available at question {current}")]
    SubmitUnavailable { current: usize },
}

/// Direction of a relative navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Where a relative step lands with respect to the materialized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget {
    /// Before question 1.
    BeforeStart,
    /// A materialized question.
    Within(usize),
    /// Past the last known question.
    BeyondEnd,
}

/// State of the "next" affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    /// Fixed mode at the last question.
    Hidden,
    /// Steps to an already materialized question.
    Advance,
    /// Endless mode at the last known question; stepping provisions one more.
    Fetch,
    /// A provisioning request is outstanding; the control is disabled.
    Loading,
}

impl NextControl {
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Advance | Self::Fetch)
    }
}

/// Logical projection of the navigation affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub previous_enabled: bool,
    pub next: NextControl,
    pub submit_visible: bool,
}

/// Navigable question set plus the client-local caches layered on it.
///
/// Invariant: `1 <= current_index() <= total_known()` after every method
/// returns, including failed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    mode: ExamMode,
    questions: QuestionSet,
    current: usize,
    provisioning: bool,
    selections: HashMap<usize, String>,
    answered: HashSet<usize>,
}

impl NavigationState {
    /// Starts at question 1.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::EmptyQuestionSet` when `questions` is empty.
    pub fn new(mode: ExamMode, questions: QuestionSet) -> Result<Self, NavigationError> {
        if questions.is_empty() {
            return Err(NavigationError::EmptyQuestionSet);
        }

        Ok(Self {
            mode,
            questions,
            current: 1,
            provisioning: false,
            selections: HashMap::new(),
            answered: HashSet::new(),
        })
    }

    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_known(&self) -> usize {
        self.questions.len()
    }

    /// Question count last reported by the server.
    ///
    /// Equals `total_known()` until the server skips ahead of the client.
    #[must_use]
    pub fn reported_total(&self) -> usize {
        self.questions.last_display_number()
    }

    /// Number the question at `position` is shown under.
    #[must_use]
    pub fn display_number(&self, position: usize) -> Option<usize> {
        self.questions.display_number(position)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_provisioning(&self) -> bool {
        self.provisioning
    }

    #[must_use]
    pub fn step_target(&self, direction: Direction) -> StepTarget {
        match direction {
            Direction::Previous if self.current <= 1 => StepTarget::BeforeStart,
            Direction::Previous => StepTarget::Within(self.current - 1),
            Direction::Next if self.current >= self.total_known() => StepTarget::BeyondEnd,
            Direction::Next => StepTarget::Within(self.current + 1),
        }
    }

    /// Makes question `number` the visible one.
    ///
    /// Calling it again with the same `number` changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Busy` while provisioning and
    /// `NavigationError::OutOfRange` when `number` is not materialized.
    pub fn jump_to(&mut self, number: usize) -> Result<(), NavigationError> {
        if self.provisioning {
            return Err(NavigationError::Busy);
        }
        self.ensure_in_range(number)?;
        self.current = number;
        Ok(())
    }

    /// Closes the provisioning gate; at most one request may be outstanding.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Busy` if the gate is already closed.
    pub fn begin_provisioning(&mut self) -> Result<(), NavigationError> {
        if self.provisioning {
            return Err(NavigationError::Busy);
        }
        self.provisioning = true;
        Ok(())
    }

    /// Reopens the gate without touching the question set.
    pub fn abort_provisioning(&mut self) {
        self.provisioning = false;
    }

    /// Appends a provisioned question and jumps to it.
    ///
    /// The server's `reported_total` is authoritative and becomes the new
    /// question's display number, even when it skips numbers the client never
    /// received. A total that does not move forward leaves the set untouched.
    /// The gate is reopened either way.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::StaleTotal` when `reported_total` does not
    /// exceed `reported_total()`.
    pub fn complete_provisioning(
        &mut self,
        question: Question,
        reported_total: usize,
    ) -> Result<usize, NavigationError> {
        self.provisioning = false;

        let known = self.reported_total();
        if reported_total <= known {
            return Err(NavigationError::StaleTotal {
                known,
                reported: reported_total,
            });
        }

        let position = self.questions.push(question, reported_total);
        self.current = position;
        Ok(position)
    }

    /// Records the locally selected option for question `number`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::OutOfRange` or `NavigationError::UnknownOption`.
    pub fn select(&mut self, number: usize, option: &str) -> Result<QuestionId, NavigationError> {
        let question = self
            .questions
            .get(number)
            .ok_or(NavigationError::OutOfRange {
                requested: number,
                total: self.total_known(),
            })?;
        if !question.has_option(option) {
            return Err(NavigationError::UnknownOption {
                number,
                option: option.to_owned(),
            });
        }

        let id = question.id().clone();
        self.selections.insert(number, option.to_owned());
        Ok(id)
    }

    #[must_use]
    pub fn selected(&self, number: usize) -> Option<&str> {
        self.selections.get(&number).map(String::as_str)
    }

    /// Marks question `number` answered after a confirmed save.
    ///
    /// Returns `false` when `number` is not materialized.
    pub fn mark_answered(&mut self, number: usize) -> bool {
        if self.questions.get(number).is_none() {
            return false;
        }
        self.answered.insert(number);
        true
    }

    #[must_use]
    pub fn is_answered(&self, number: usize) -> bool {
        self.answered.contains(&number)
    }

    #[must_use]
    pub fn controls(&self) -> ControlState {
        let at_last = self.current == self.total_known();
        let next = if self.provisioning {
            NextControl::Loading
        } else if !at_last {
            NextControl::Advance
        } else if self.mode.is_endless() {
            NextControl::Fetch
        } else {
            NextControl::Hidden
        };

        ControlState {
            previous_enabled: self.current != 1 && !self.provisioning,
            next,
            submit_visible: at_last,
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.controls().submit_visible
    }

    fn ensure_in_range(&self, number: usize) -> Result<(), NavigationError> {
        if number == 0 || number > self.total_known() {
            return Err(NavigationError::OutOfRange {
                requested: number,
                total: self.total_known(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u64) -> Question {
        Question::new(
            QuestionId::from(id),
            format!("Q{id}"),
            vec!["a".into(), "b".into(), "c".into()],
        )
        .unwrap()
    }

    fn state(mode: ExamMode, count: u64) -> NavigationState {
        let questions = (1..=count).map(question).collect();
        NavigationState::new(mode, QuestionSet::new(questions)).unwrap()
    }

    #[test]
    fn empty_set_is_rejected() {
        let result = NavigationState::new(ExamMode::Fixed, QuestionSet::default());
        assert_eq!(result.unwrap_err(), NavigationError::EmptyQuestionSet);
    }

    #[test]
    fn fixed_mode_controls_follow_position() {
        let mut nav = state(ExamMode::Fixed, 3);

        let first = nav.controls();
        assert!(!first.previous_enabled);
        assert_eq!(first.next, NextControl::Advance);
        assert!(!first.submit_visible);

        nav.jump_to(2).unwrap();
        let middle = nav.controls();
        assert!(middle.previous_enabled);
        assert_eq!(middle.next, NextControl::Advance);
        assert!(!middle.submit_visible);

        nav.jump_to(3).unwrap();
        let last = nav.controls();
        assert!(last.previous_enabled);
        assert_eq!(last.next, NextControl::Hidden);
        assert!(last.submit_visible);
    }

    #[test]
    fn endless_mode_offers_fetch_and_submit_at_last() {
        let nav = state(ExamMode::Endless, 1);
        let controls = nav.controls();
        assert!(!controls.previous_enabled);
        assert_eq!(controls.next, NextControl::Fetch);
        assert!(controls.submit_visible);
    }

    #[test]
    fn jump_is_idempotent_and_bounded() {
        let mut nav = state(ExamMode::Fixed, 3);
        nav.jump_to(2).unwrap();
        let once = nav.clone();
        nav.jump_to(2).unwrap();
        assert_eq!(nav, once);

        assert_eq!(
            nav.jump_to(4).unwrap_err(),
            NavigationError::OutOfRange {
                requested: 4,
                total: 3
            }
        );
        assert!(nav.jump_to(0).is_err());
        assert_eq!(nav.current_index(), 2);
    }

    #[test]
    fn step_targets() {
        let mut nav = state(ExamMode::Fixed, 2);
        assert_eq!(nav.step_target(Direction::Previous), StepTarget::BeforeStart);
        assert_eq!(nav.step_target(Direction::Next), StepTarget::Within(2));
        nav.jump_to(2).unwrap();
        assert_eq!(nav.step_target(Direction::Next), StepTarget::BeyondEnd);
        assert_eq!(nav.step_target(Direction::Previous), StepTarget::Within(1));
    }

    #[test]
    fn provisioning_gate_admits_one_request() {
        let mut nav = state(ExamMode::Endless, 1);
        nav.begin_provisioning().unwrap();
        assert_eq!(nav.begin_provisioning().unwrap_err(), NavigationError::Busy);
        assert_eq!(nav.jump_to(1).unwrap_err(), NavigationError::Busy);

        let controls = nav.controls();
        assert_eq!(controls.next, NextControl::Loading);
        assert!(!controls.next.is_enabled());
        assert!(!controls.previous_enabled);
    }

    #[test]
    fn completed_provisioning_appends_and_jumps() {
        let mut nav = state(ExamMode::Endless, 1);
        nav.begin_provisioning().unwrap();
        let number = nav.complete_provisioning(question(2), 2).unwrap();

        assert_eq!(number, 2);
        assert_eq!(nav.total_known(), 2);
        assert_eq!(nav.current_index(), 2);
        assert!(!nav.is_provisioning());
        assert_eq!(nav.controls().next, NextControl::Fetch);
    }

    #[test]
    fn total_skipping_ahead_becomes_the_display_number() {
        let mut nav = state(ExamMode::Endless, 1);
        nav.begin_provisioning().unwrap();
        let position = nav.complete_provisioning(question(3), 3).unwrap();

        assert_eq!(position, 2);
        assert_eq!(nav.total_known(), 2);
        assert_eq!(nav.reported_total(), 3);
        assert_eq!(nav.current_index(), 2);
        assert_eq!(nav.display_number(2), Some(3));
        assert_eq!(nav.controls().next, NextControl::Fetch);

        nav.begin_provisioning().unwrap();
        assert_eq!(nav.complete_provisioning(question(4), 4).unwrap(), 3);
        assert_eq!(nav.display_number(3), Some(4));
    }

    #[test]
    fn total_that_does_not_advance_leaves_set_untouched() {
        let mut nav = state(ExamMode::Endless, 2);
        nav.begin_provisioning().unwrap();
        let err = nav.complete_provisioning(question(9), 2).unwrap_err();

        assert_eq!(
            err,
            NavigationError::StaleTotal {
                known: 2,
                reported: 2
            }
        );
        assert_eq!(nav.total_known(), 2);
        assert_eq!(nav.current_index(), 1);
        assert!(!nav.is_provisioning());
    }

    #[test]
    fn selection_and_answered_marks_are_tracked_per_question() {
        let mut nav = state(ExamMode::Fixed, 2);
        let id = nav.select(2, "b").unwrap();
        assert_eq!(id, QuestionId::from(2));
        assert_eq!(nav.selected(2), Some("b"));
        assert!(!nav.is_answered(2));

        assert!(nav.mark_answered(2));
        assert!(nav.mark_answered(2));
        assert!(nav.is_answered(2));
        assert!(!nav.is_answered(1));

        assert!(matches!(
            nav.select(1, "z"),
            Err(NavigationError::UnknownOption { number: 1, .. })
        ));
        assert!(!nav.mark_answered(3));
    }

    #[test]
    fn repeated_question_id_keeps_marks_apart() {
        let mut nav = state(ExamMode::Endless, 1);
        nav.begin_provisioning().unwrap();
        nav.complete_provisioning(question(1), 2).unwrap();

        nav.select(2, "c").unwrap();
        nav.mark_answered(2);

        assert!(nav.is_answered(2));
        assert!(!nav.is_answered(1));
        assert_eq!(nav.selected(1), None);
        assert_eq!(nav.selected(2), Some("c"));
    }
}
