mod render;

use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quiz_core::model::{AttemptId, QuizId};
use services::{
    ApiConfig, AttemptCommand, AttemptOutcome, AttemptRunner, AttemptService, HistoryFilter,
    HttpQuizApi, QuizApi, ResultService,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidPage { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidPage { raw } => write!(f, "invalid --page value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- take   --quiz <id>    [--api <url>] [--token <token>]");
    eprintln!("  cargo run -p app -- result --attempt <id> [--api <url>] [--token <token>]");
    eprintln!("  cargo run -p app -- history [--page <n>] [--high-scores] [--api <url>] [--token <token>]");
    eprintln!();
    eprintln!("Commands while taking a quiz:");
    eprintln!("  n / p         next / previous question");
    eprintln!("  j <n>         jump to question n");
    eprintln!("  a <letter>    answer the current question (A, B, ...)");
    eprintln!("  s             submit (y to confirm, c to cancel)");
    eprintln!("  q             leave without submitting");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL (default {}), QUIZ_API_TOKEN", services::config::DEFAULT_API_URL);
    eprintln!("  RUST_LOG (default info)");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Take { quiz_id: QuizId },
    Result { attempt_id: AttemptId },
    History { page: u32, filter: HistoryFilter },
}

struct Args {
    command: Command,
    api_url: Option<String>,
    token: Option<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let name = match args.next() {
            None => return Ok(None),
            Some(arg) if arg == "--help" || arg == "-h" => return Ok(None),
            Some(arg) => arg,
        };
        if !matches!(name.as_str(), "take" | "result" | "history") {
            return Err(ArgsError::UnknownCommand(name));
        }

        let mut quiz = None;
        let mut attempt = None;
        let mut page = 1;
        let mut filter = HistoryFilter::All;
        let mut api_url = None;
        let mut token = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quiz" => quiz = Some(require_value(&mut args, "--quiz")?),
                "--attempt" => attempt = Some(require_value(&mut args, "--attempt")?),
                "--api" => api_url = Some(require_value(&mut args, "--api")?),
                "--token" => token = Some(require_value(&mut args, "--token")?),
                "--page" => {
                    let value = require_value(&mut args, "--page")?;
                    page = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidPage { raw: value })?;
                }
                "--high-scores" => filter = HistoryFilter::HighScores,
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match name.as_str() {
            "take" => {
                let quiz = quiz.ok_or(ArgsError::MissingFlag { flag: "--quiz" })?;
                Command::Take {
                    quiz_id: QuizId::new(quiz),
                }
            }
            "result" => {
                let attempt = attempt.ok_or(ArgsError::MissingFlag { flag: "--attempt" })?;
                Command::Result {
                    attempt_id: AttemptId::new(attempt),
                }
            }
            _ => Command::History { page, filter },
        };

        Ok(Some(Self {
            command,
            api_url,
            token,
        }))
    }

    /// Flags win over `QUIZ_API_URL` / `QUIZ_API_TOKEN`.
    fn api_config(&self) -> Result<ApiConfig, services::ConfigError> {
        let config = match &self.api_url {
            Some(url) => ApiConfig::new(url)?.with_token(std::env::var("QUIZ_API_TOKEN").ok()),
            None => ApiConfig::from_env()?,
        };
        Ok(match &self.token {
            Some(token) => config.with_token(Some(token.clone())),
            None => config,
        })
    }
}

/// Map one line of user input to a command. Question numbers are 1-based.
fn parse_command(line: &str) -> Option<AttemptCommand> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_ascii_lowercase();
    let arg = parts.next();
    let command = match (head.as_str(), arg) {
        ("n" | "next", None) => AttemptCommand::Next,
        ("p" | "prev", None) => AttemptCommand::Previous,
        ("s" | "submit", None) => AttemptCommand::RequestSubmit,
        ("y" | "yes", None) => AttemptCommand::ConfirmSubmit,
        ("c" | "cancel", None) => AttemptCommand::CancelSubmit,
        ("q" | "quit", None) => AttemptCommand::Leave,
        ("j" | "jump", Some(n)) => AttemptCommand::JumpTo(n.parse::<usize>().ok()?.checked_sub(1)?),
        ("a" | "answer", Some(choice)) => AttemptCommand::SelectCurrent(option_index(choice)?),
        _ => return None,
    };
    parts.next().is_none().then_some(command)
}

/// `B`, `b` or `2` all pick the second option.
fn option_index(choice: &str) -> Option<usize> {
    if let Ok(n) = choice.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = choice.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() || !letter.is_ascii_uppercase() {
        return None;
    }
    Some(usize::from(letter as u8 - b'A'))
}

/// Stdin is read on a plain thread so a pending read never holds the runtime open.
fn spawn_input(commands: mpsc::Sender<AttemptCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(command) => {
                    if commands.blocking_send(command).is_err() {
                        break;
                    }
                }
                None => eprintln!("unrecognized command: {}", line.trim()),
            }
        }
    });
}

async fn take(
    api: Arc<dyn QuizApi>,
    config: &ApiConfig,
    quiz_id: QuizId,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = AttemptService::new(Arc::clone(&api), config.auth());
    let session = service.start(quiz_id).await;

    let (runner, snapshots) = AttemptRunner::new(service, session);
    let (commands, rx) = mpsc::channel(32);
    spawn_input(commands);
    let screen = tokio::spawn(render::follow(snapshots));

    let outcome = runner.run(rx).await;
    // the runner dropped its sender, so the screen task drains and exits
    join_screen(screen).await;

    match outcome {
        AttemptOutcome::Completed(receipt) => {
            info!(attempt_id = %receipt.attempt_id, "attempt completed");
            let results = ResultService::new(api, config.auth());
            let view = results.view_for(receipt.result).await;
            print!("{}", render::result_screen(&view));
            Ok(())
        }
        AttemptOutcome::Failed(message) => Err(message.into()),
        AttemptOutcome::Abandoned => {
            println!("Attempt abandoned.");
            Ok(())
        }
    }
}

/// Wait for the render task; returns false if it panicked or was cancelled.
async fn join_screen(screen: JoinHandle<()>) -> bool {
    match screen.await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "render task ended abnormally");
            false
        }
    }
}

async fn show_history(
    api: Arc<dyn QuizApi>,
    config: &ApiConfig,
    page: u32,
    filter: HistoryFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = ResultService::new(api, config.auth());
    let view = results.load_history(page, filter).await?;
    print!("{}", render::history_screen(&view));
    Ok(())
}

async fn show_result(
    api: Arc<dyn QuizApi>,
    config: &ApiConfig,
    attempt_id: &AttemptId,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = ResultService::new(api, config.auth());
    let view = results.load(attempt_id).await?;
    print!("{}", render::result_screen(&view));
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    init_logging();
    let config = parsed.api_config()?;
    info!(api = %config.base_url, "using quiz backend");
    let api: Arc<dyn QuizApi> = Arc::new(HttpQuizApi::new(&config));

    match parsed.command {
        Command::Take { quiz_id } => take(api, &config, quiz_id).await,
        Command::Result { attempt_id } => show_result(api, &config, &attempt_id).await,
        Command::History { page, filter } => show_history(api, &config, page, filter).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
