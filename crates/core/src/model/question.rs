use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id} has a blank option at position {position}")]
    BlankOption { id: QuestionId, position: usize },
}

/// One multiple-choice question as materialized on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
}

impl Question {
    /// Builds a question, validating its options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` if `options` is empty and
    /// `QuestionError::BlankOption` if any option is blank.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }
        if let Some(position) = options.iter().position(|option| option.trim().is_empty()) {
            return Err(QuestionError::BlankOption { id, position });
        }

        Ok(Self {
            id,
            text: text.into(),
            options,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }
}

/// Ordered, append-only sequence of questions at positions numbered from 1.
///
/// Each question also carries the number the server assigned it. Initial
/// questions are numbered by position; provisioned ones may skip ahead when
/// the server has committed questions the client never received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
    display_numbers: Vec<usize>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        let display_numbers = (1..=questions.len()).collect();
        Self {
            questions,
            display_numbers,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the question at 1-based `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Question> {
        position
            .checked_sub(1)
            .and_then(|index| self.questions.get(index))
    }

    /// Server-assigned number of the question at `position`.
    #[must_use]
    pub fn display_number(&self, position: usize) -> Option<usize> {
        position
            .checked_sub(1)
            .and_then(|index| self.display_numbers.get(index))
            .copied()
    }

    /// Display number of the last question, or 0 when empty.
    #[must_use]
    pub fn last_display_number(&self) -> usize {
        self.display_numbers.last().copied().unwrap_or(0)
    }

    /// Position of the question displayed as `display_number`.
    #[must_use]
    pub fn position_of(&self, display_number: usize) -> Option<usize> {
        self.display_numbers
            .iter()
            .position(|&number| number == display_number)
            .map(|index| index + 1)
    }

    /// Appends `question` under `display_number` and returns its position.
    ///
    /// Callers keep display numbers increasing.
    pub fn push(&mut self, question: Question, display_number: usize) -> usize {
        self.questions.push(question);
        self.display_numbers.push(display_number);
        self.questions.len()
    }

    /// Iterates `(position, question)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Question)> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| (index + 1, question))
    }
}
