use services::EnvironmentSignal;

use crate::views::ViewError;

/// A user or environment action entered at the exam prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    Previous,
    Next,
    Jump(usize),
    /// Selects an option of the visible question, by 1-based position or label.
    Answer(String),
    Signal(EnvironmentSignal),
    Submit,
    Show,
    Quit,
}

/// # Errors
///
/// Returns `ViewError::UnknownCommand` for unrecognized input and
/// `ViewError::MissingArgument` when a command lacks its argument.
pub fn parse_intent(line: &str) -> Result<ExamIntent, ViewError> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));

    let intent = match command.to_ascii_lowercase().as_str() {
        "p" | "prev" | "previous" => ExamIntent::Previous,
        "n" | "next" => ExamIntent::Next,
        "j" | "jump" => {
            let number = rest
                .parse()
                .map_err(|_| ViewError::MissingArgument("jump <question number>"))?;
            ExamIntent::Jump(number)
        }
        "a" | "answer" => {
            if rest.is_empty() {
                return Err(ViewError::MissingArgument("answer <option>"));
            }
            ExamIntent::Answer(rest.to_owned())
        }
        "hide" => ExamIntent::Signal(EnvironmentSignal::Hidden),
        "visible" | "unhide" => ExamIntent::Signal(EnvironmentSignal::Visible),
        "blur" => ExamIntent::Signal(EnvironmentSignal::Blur),
        "focus" => ExamIntent::Signal(EnvironmentSignal::Focus),
        "copy" => ExamIntent::Signal(EnvironmentSignal::Copy),
        "cut" => ExamIntent::Signal(EnvironmentSignal::Cut),
        "paste" => ExamIntent::Signal(EnvironmentSignal::Paste),
        "menu" => ExamIntent::Signal(EnvironmentSignal::ContextMenu),
        "submit" => ExamIntent::Submit,
        "" | "show" => ExamIntent::Show,
        "q" | "quit" | "exit" => ExamIntent::Quit,
        _ => return Err(ViewError::UnknownCommand(command.to_owned())),
    };
    Ok(intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_answers() {
        assert_eq!(parse_intent("next").unwrap(), ExamIntent::Next);
        assert_eq!(parse_intent("  P ").unwrap(), ExamIntent::Previous);
        assert_eq!(parse_intent("jump 4").unwrap(), ExamIntent::Jump(4));
        assert_eq!(
            parse_intent("answer Paris, France").unwrap(),
            ExamIntent::Answer("Paris, France".into())
        );
        assert_eq!(
            parse_intent("menu").unwrap(),
            ExamIntent::Signal(EnvironmentSignal::ContextMenu)
        );
        assert_eq!(parse_intent("").unwrap(), ExamIntent::Show);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_intent("jump x"),
            Err(ViewError::MissingArgument(_))
        ));
        assert!(matches!(parse_intent("answer"), Err(ViewError::MissingArgument(_))));
        assert_eq!(
            parse_intent("dance").unwrap_err(),
            ViewError::UnknownCommand("dance".into())
        );
    }
}
