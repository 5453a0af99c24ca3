use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use exam_core::model::{Direction, ExamMode, NavigationError, Question, QuestionId};
use serde::Deserialize;
use services::{
    CameraSource, ChannelNotifier, Clock, ControllerError, DeniedCamera, ExamConfig, ExamSession,
    NavigateOutcome, Notice, SessionBootstrap, SyntheticCamera,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;
use ui::views::render_text;
use ui::vm::{ExamIntent, ExamVm, parse_intent};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingRequired { flag: &'static str, env: &'static str },
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidTotal { raw: String },
    InvalidCamera { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingRequired { flag, env } => {
                write!(f, "{flag} is required (or set {env})")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidTotal { raw } => write!(f, "invalid --total value: {raw}"),
            ArgsError::InvalidCamera { raw } => write!(f, "invalid --camera value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraChoice {
    None,
    Synthetic,
    Denied,
}

impl CameraChoice {
    fn from_arg(raw: &str) -> Option<Self> {
        match raw {
            "none" => Some(Self::None),
            "synthetic" => Some(Self::Synthetic),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    fn source(self) -> Option<Arc<dyn CameraSource>> {
        match self {
            Self::None => None,
            Self::Synthetic => Some(Arc::new(SyntheticCamera::default())),
            Self::Denied => Some(Arc::new(DeniedCamera)),
        }
    }
}

struct Args {
    session_id: String,
    mode: ExamMode,
    questions: PathBuf,
    total: Option<usize>,
    base_url: Option<String>,
    camera: CameraChoice,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --session-id <id> --questions <file.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --mode fixed|endless        (default fixed)");
    eprintln!("  --endless true|false        page flag; overrides --mode");
    eprintln!("  --total <n>                 declared initial question count");
    eprintln!("  --base-url <url>            backend base url");
    eprintln!("  --camera none|synthetic|denied  (default none)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_SESSION_ID, EXAM_MODE, EXAM_QUESTIONS, EXAM_BASE_URL, EXAM_COOKIE,");
    eprintln!("  EXAM_REQUEST_TIMEOUT_SECS, EXAM_SNAPSHOT_INTERVAL_SECS, EXAM_DEBUG_LOG");
    eprintln!();
    eprintln!("Commands at the prompt:");
    eprintln!("  next, prev, jump <n>, answer <option|position>, submit, show, quit");
    eprintln!("  hide, visible, blur, focus, copy, cut, paste, menu");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut session_id = env::var("EXAM_SESSION_ID").ok();
        let mut mode_raw = env::var("EXAM_MODE").ok();
        let mut endless_flag = None;
        let mut questions = env::var("EXAM_QUESTIONS").ok().map(PathBuf::from);
        let mut total = None;
        let mut base_url = None;
        let mut camera = CameraChoice::None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--session-id" => session_id = Some(require_value(args, "--session-id")?),
                "--mode" => mode_raw = Some(require_value(args, "--mode")?),
                "--endless" => endless_flag = Some(require_value(args, "--endless")?),
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--total" => {
                    let value = require_value(args, "--total")?;
                    let parsed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTotal { raw: value.clone() })?;
                    total = Some(parsed);
                }
                "--base-url" => base_url = Some(require_value(args, "--base-url")?),
                "--camera" => {
                    let value = require_value(args, "--camera")?;
                    camera = CameraChoice::from_arg(&value)
                        .ok_or(ArgsError::InvalidCamera { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        // The page's `is-endless` flag wins over an explicit mode name.
        let mode = match (endless_flag, mode_raw) {
            (Some(flag), _) => ExamMode::from_endless_flag(&flag),
            (None, None) => ExamMode::Fixed,
            (None, Some(raw)) => raw
                .parse()
                .map_err(|_| ArgsError::InvalidMode { raw: raw.clone() })?,
        };

        Ok(Self {
            session_id: session_id.ok_or(ArgsError::MissingRequired {
                flag: "--session-id",
                env: "EXAM_SESSION_ID",
            })?,
            mode,
            questions: questions.ok_or(ArgsError::MissingRequired {
                flag: "--questions",
                env: "EXAM_QUESTIONS",
            })?,
            total,
            base_url,
            camera,
        })
    }
}

#[derive(Deserialize)]
struct QuestionFile {
    id: QuestionId,
    text: String,
    options: Vec<String>,
}

fn load_questions(path: &Path) -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let entries: Vec<QuestionFile> = serde_json::from_str(&raw)?;
    let mut questions = Vec::with_capacity(entries.len());
    for entry in entries {
        questions.push(Question::new(entry.id, entry.text, entry.options)?);
    }
    Ok(questions)
}

/// `EXAM_DEBUG_LOG` wins over `RUST_LOG` when truthy.
fn debug_log_requested(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "yes" | "YES"))
}

fn init_logging() {
    let debug_value = env::var("EXAM_DEBUG_LOG").ok();
    let filter = if debug_log_requested(debug_value.as_deref()) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // stdout carries the rendered exam.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves `choice` against the visible question: a 1-based position or an
/// exact option label.
fn resolve_option(session: &ExamSession, choice: &str) -> Option<(usize, String)> {
    let state = session.controller().snapshot();
    let number = state.current_index();
    let options = state.current_question()?.options();
    let option = match choice.parse::<usize>() {
        Ok(position) if (1..=options.len()).contains(&position) => options[position - 1].clone(),
        _ => options.iter().find(|option| option.as_str() == choice)?.clone(),
    };
    Some((number, option))
}

fn render(session: &ExamSession, notices: &mut UnboundedReceiver<Notice>) {
    let mut pending = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        pending.push(notice);
    }
    let vm = ExamVm::project(
        &session.controller().snapshot(),
        *session.elapsed().borrow(),
        &pending,
    );
    print!("{}", render_text(&vm));
    println!("> ");
}

enum Flow {
    Continue,
    Stop,
}

/// Navigates in the background so the prompt keeps taking answers and
/// signals while a question loads. `settled` fires once it finishes.
fn step(session: &ExamSession, direction: Direction, settled: &UnboundedSender<()>) {
    let controller = session.controller().clone();
    let settled = settled.clone();
    tokio::spawn(async move {
        match controller.navigate(direction).await {
            Ok(NavigateOutcome::Busy) => println!("A question is loading, please wait."),
            Ok(NavigateOutcome::AtEnd) => println!("This is the last question."),
            Ok(_) => {}
            // The failure notice is already queued.
            Err(ControllerError::Provision(_)) => {}
            Err(err) => println!("{err}"),
        }
        let _ = settled.send(());
    });
}

/// Jumps to the question shown as `label` in the navigator.
fn jump(session: &ExamSession, label: usize) {
    let controller = session.controller();
    let Some(position) = controller.snapshot().questions().position_of(label) else {
        println!("no question {label}");
        return;
    };
    if let Err(err) = controller.jump_to(position) {
        println!("{err}");
    }
}

async fn apply(
    session: &mut ExamSession,
    intent: ExamIntent,
    settled: &UnboundedSender<()>,
) -> Flow {
    match intent {
        ExamIntent::Previous => step(session, Direction::Previous, settled),
        ExamIntent::Next => step(session, Direction::Next, settled),
        ExamIntent::Jump(label) => jump(session, label),
        ExamIntent::Answer(choice) => match resolve_option(session, &choice) {
            Some((number, option)) => {
                if let Err(err) = session.controller().select_answer(number, &option) {
                    println!("{err}");
                }
            }
            None => println!("no such option: {choice}"),
        },
        ExamIntent::Signal(signal) => {
            if session.monitor().observe(signal).blocks_default() {
                println!("That action is disabled during the exam.");
            }
        }
        ExamIntent::Submit => match session.submit().await {
            Ok(()) => {
                println!("Exam submitted.");
                return Flow::Stop;
            }
            Err(ControllerError::Navigation(NavigationError::SubmitUnavailable { .. })) => {
                println!("Submission is available on the last question.");
            }
            Err(err) => {
                println!("{err}");
                if session.is_ended() {
                    return Flow::Stop;
                }
            }
        },
        ExamIntent::Show => {}
        ExamIntent::Quit => return Flow::Stop,
    }
    Flow::Continue
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = ExamConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url)?;
    }
    tracing::debug!(?config, "configuration loaded");

    let questions = load_questions(&args.questions)?;
    let mut bootstrap = SessionBootstrap::new(args.session_id, args.mode, questions);
    if let Some(total) = args.total {
        bootstrap = bootstrap.with_declared_total(total);
    }

    let (notifier, mut notices) = ChannelNotifier::new();
    let mut session = ExamSession::start(
        bootstrap,
        Arc::new(config.http_backend()?),
        args.camera.source(),
        Arc::new(notifier),
        config.settings(Clock::system()),
    )?;

    render(&session, &mut notices);
    let (settled_tx, mut settled_rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let flow = match parse_intent(&line) {
                    Ok(intent) => apply(&mut session, intent, &settled_tx).await,
                    Err(err) => {
                        println!("{err}");
                        Flow::Continue
                    }
                };
                if matches!(flow, Flow::Stop) {
                    break;
                }
            }
            Some(()) = settled_rx.recv() => {}
        }
        render(&session, &mut notices);
    }

    session.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_log_flag_accepts_truthy_values_only() {
        assert!(debug_log_requested(Some("1")));
        assert!(debug_log_requested(Some("yes")));
        assert!(debug_log_requested(Some("TRUE")));
        assert!(!debug_log_requested(Some("0")));
        assert!(!debug_log_requested(Some("")));
        assert!(!debug_log_requested(None));
    }
}
