pub mod history;
pub mod play;
pub mod render;
pub mod theme;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};
use crate::AppState;

#[derive(Parser, Debug)]
#[command(name = "quizsmith", version, about = "Generate, take and track AI-written quizzes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a quiz and take it in the terminal.
    Play(play::PlayArgs),
    /// Show past attempts, or clear them.
    History {
        #[command(subcommand)]
        action: Option<history::HistoryAction>,
    },
    /// Show or change the theme preference.
    Theme {
        #[command(subcommand)]
        action: Option<theme::ThemeAction>,
    },
}

pub async fn dispatch(state: &AppState, cli: Cli) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    match cli.command {
        Command::Play(args) => play::run(state, args, &mut input, &mut out).await,
        Command::History { action } => history::run(state, action, &mut input, &mut out).await,
        Command::Theme { action } => theme::run(state, action, &mut out).await,
    }
}

/// Prints a prompt and reads one trimmed line; `None` on end of input.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<bool> {
    let answer = prompt(input, out, message)?;
    Ok(matches!(
        answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y") | Some("yes")
    ))
}

/// Shows the notification for errors that send the user back to settings
/// capture. Anything else is handed back to the caller.
pub fn notify_or_propagate<W: Write>(out: &mut W, err: Error) -> Result<()> {
    if err.is_generation_failure() || matches!(err, Error::Validation(_)) {
        let (title, description) = err.user_notification();
        writeln!(out, "{}: {}", title, description)?;
        return Ok(());
    }
    Err(err)
}
