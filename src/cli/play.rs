use clap::Args;
use std::io::{BufRead, Write};

use crate::cli::{confirm, notify_or_propagate, prompt, render};
use crate::dto::settings_dto::SettingsInput;
use crate::error::{Error, Result};
use crate::models::question::option_index_from_label;
use crate::models::settings::{
    clamp_question_count, is_known_model, Difficulty, ViewMode, DEFAULT_MODEL,
};
use crate::quiz::{QuizSession, SessionStatus};
use crate::AppState;

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// What the quiz should be about. Asked for when omitted.
    #[arg(short, long)]
    pub topic: Option<String>,

    #[arg(short, long, default_value_t = Difficulty::Medium)]
    pub difficulty: Difficulty,

    /// Generative model identifier.
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Number of questions, clamped to 5-20.
    #[arg(short = 'n', long, default_value = "10")]
    pub count: String,

    /// `list` shows every question at once, `single` one at a time.
    #[arg(short, long, default_value_t = ViewMode::List)]
    pub view: ViewMode,

    /// Overrides the stored API key.
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `question` is zero-based; `None` means the current question.
    Answer { question: Option<usize>, option: usize },
    Next,
    Previous,
    Show,
    Submit,
    Quit,
    Help,
}

/// Parses one line typed while answering: `b`, `3b`, `3 b`, `n`, `p`,
/// `l`, `s`, `q` or `?`.
pub fn parse_action(line: &str) -> Option<Action> {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "n" | "next" => return Some(Action::Next),
        "p" | "prev" | "previous" => return Some(Action::Previous),
        "l" | "list" | "show" => return Some(Action::Show),
        "s" | "submit" => return Some(Action::Submit),
        "q" | "quit" | "exit" => return Some(Action::Quit),
        "?" | "h" | "help" => return Some(Action::Help),
        _ => {}
    }

    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let label = compact.chars().last()?;
    let option = option_index_from_label(label)?;
    let number = &compact[..compact.len() - label.len_utf8()];
    if number.is_empty() {
        return Some(Action::Answer {
            question: None,
            option,
        });
    }
    let question = number.parse::<usize>().ok().filter(|n| *n > 0)?;
    Some(Action::Answer {
        question: Some(question - 1),
        option,
    })
}

enum LoopExit {
    Submit,
    Quit,
}

pub async fn run<R: BufRead, W: Write>(
    state: &AppState,
    args: PlayArgs,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let topic = match args.topic {
        Some(topic) => topic,
        None => prompt(input, out, "Quiz topic: ")?.unwrap_or_default(),
    };

    let api_key = match args.api_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => state
            .preferences_service
            .api_key()
            .await?
            .or_else(|| state.default_api_key.clone())
            .unwrap_or_default(),
    };

    if !is_known_model(&args.model) {
        tracing::warn!(model = %args.model, "Using a model outside the known list");
    }

    let settings = SettingsInput {
        topic,
        difficulty: args.difficulty,
        model: args.model,
        question_count: clamp_question_count(&args.count),
        view_mode: args.view,
        api_key,
    };

    writeln!(out, "Generating your quiz...")?;
    let mut session = match state.quiz_service.begin(settings).await {
        Ok(session) => session,
        Err(e) => return notify_or_propagate(out, e),
    };

    loop {
        match answer_loop(&mut session, input, out)? {
            LoopExit::Quit => {
                writeln!(out, "Quiz abandoned.")?;
                return Ok(());
            }
            LoopExit::Submit => {}
        }

        save_result(state, &mut session, input, out).await?;
        render::result(out, &session)?;

        if !confirm(input, out, "Retake this quiz? [y/N] ")? {
            return Ok(());
        }
        writeln!(out, "Generating your quiz...")?;
        session = match state.quiz_service.retake(&mut session).await {
            Ok(fresh) => fresh,
            Err(e) => return notify_or_propagate(out, e),
        };
    }
}

/// Submits the attempt to history. When the write fails the user can try
/// again or see the result without saving it.
async fn save_result<R: BufRead, W: Write>(
    state: &AppState,
    session: &mut QuizSession,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        match state.quiz_service.submit(session).await {
            Ok(_) => return Ok(()),
            Err(
                e @ (Error::IncompleteAnswers { .. }
                | Error::AlreadySubmitted
                | Error::InvalidState(_)),
            ) => return Err(e),
            Err(e) => {
                writeln!(out, "Could not save the result to history: {}", e)?;
                if matches!(e, Error::HistoryParse(_)) {
                    writeln!(out, "Stored history is unreadable; `quizsmith history clear` resets it.")?;
                }
                if !confirm(input, out, "Try saving again? [y/N] ")? {
                    session.submit()?;
                    return Ok(());
                }
            }
        }
    }
}

fn answer_loop<R: BufRead, W: Write>(
    session: &mut QuizSession,
    input: &mut R,
    out: &mut W,
) -> Result<LoopExit> {
    let single = session.settings().view_mode == ViewMode::Single;
    writeln!(
        out,
        "{} - {} questions. Type `?` for help.\n",
        session.settings().topic,
        session.questions().len()
    )?;
    show(session, single, out)?;

    while session.status() == SessionStatus::Answering {
        let Some(line) = prompt(input, out, "> ")? else {
            return Ok(LoopExit::Quit);
        };
        let Some(action) = parse_action(&line) else {
            writeln!(out, "Unrecognized input `{}`. Type `?` for help.", line)?;
            continue;
        };

        match action {
            Action::Answer { question, option } => {
                let index = question.unwrap_or(session.current_index());
                if index >= session.questions().len() {
                    writeln!(out, "There is no question {}.", index + 1)?;
                    continue;
                }
                session.select_answer(index, option)?;
                if single && !session.is_last() {
                    session.advance();
                    render::current_question(out, session)?;
                } else {
                    render::status_line(out, session)?;
                }
            }
            Action::Next => {
                session.advance();
                render::current_question(out, session)?;
            }
            Action::Previous => {
                session.retreat();
                render::current_question(out, session)?;
            }
            Action::Show => show(session, single, out)?,
            Action::Submit => {
                let unanswered = session.unanswered();
                if unanswered.is_empty() {
                    return Ok(LoopExit::Submit);
                }
                let numbers: Vec<String> =
                    unanswered.iter().map(|i| (i + 1).to_string()).collect();
                writeln!(
                    out,
                    "Answer all questions before submitting (unanswered: {}).",
                    numbers.join(", ")
                )?;
            }
            Action::Quit => return Ok(LoopExit::Quit),
            Action::Help => help(out)?,
        }
    }
    Ok(LoopExit::Submit)
}

fn show<W: Write>(session: &QuizSession, single: bool, out: &mut W) -> Result<()> {
    if single {
        render::current_question(out, session)
    } else {
        render::all_questions(out, session)
    }
}

fn help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "  a-d        answer the current question")?;
    writeln!(out, "  3b, 3 b    answer question 3 with option B")?;
    writeln!(out, "  n / p      next / previous question")?;
    writeln!(out, "  l          show the questions again")?;
    writeln!(out, "  s          submit")?;
    writeln!(out, "  q          quit without saving")?;
    Ok(())
}
