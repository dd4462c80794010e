use std::io::Write;

use crate::error::Result;
use crate::models::history::{HistoryEntry, HistoryStats, ScoreBand};
use crate::models::question::{option_label, QuestionRecord};
use crate::quiz::QuizSession;
use crate::utils::time::{format_clock, format_completion, format_history_date};

pub fn question<W: Write>(
    out: &mut W,
    index: usize,
    q: &QuestionRecord,
    chosen: Option<usize>,
) -> Result<()> {
    writeln!(out, "{}. {}", index + 1, q.text)?;
    for (i, option) in q.options.iter().enumerate() {
        let marker = if chosen == Some(i) { '*' } else { ' ' };
        writeln!(out, "  {} {}) {}", marker, option_label(i), option)?;
    }
    Ok(())
}

pub fn all_questions<W: Write>(out: &mut W, session: &QuizSession) -> Result<()> {
    for (i, (q, chosen)) in session.questions().iter().zip(session.answers()).enumerate() {
        question(out, i, q, *chosen)?;
        writeln!(out)?;
    }
    status_line(out, session)
}

pub fn current_question<W: Write>(out: &mut W, session: &QuizSession) -> Result<()> {
    let Some(q) = session.current_question() else {
        return Ok(());
    };
    writeln!(
        out,
        "Question {} / {}  ({}%)  {}",
        session.current_index() + 1,
        session.questions().len(),
        session.progress_percent(),
        format_clock(session.elapsed_seconds())
    )?;
    question(out, session.current_index(), q, session.answers()[session.current_index()])
}

pub fn status_line<W: Write>(out: &mut W, session: &QuizSession) -> Result<()> {
    writeln!(
        out,
        "Answered {} of {}  |  time {}",
        session.answered_count(),
        session.questions().len(),
        format_clock(session.elapsed_seconds())
    )?;
    Ok(())
}

pub fn result<W: Write>(out: &mut W, session: &QuizSession) -> Result<()> {
    if let Some(message) = session.completion_message() {
        writeln!(out, "Quiz Completed! {}", message)?;
    }
    if let Some(percent) = session.percent_correct() {
        writeln!(out, "{}% Correct", percent)?;
    }
    writeln!(out)?;

    for review in session.review() {
        let q = &session.questions()[review.index];
        let mark = if review.is_correct { "correct" } else { "wrong" };
        writeln!(out, "{}. {} [{}]", review.index + 1, q.text, mark)?;
        if let Some(chosen) = review.chosen {
            writeln!(out, "   your answer: {}) {}", option_label(chosen), q.options[chosen])?;
        }
        if !review.is_correct {
            writeln!(
                out,
                "   correct answer: {}) {}",
                option_label(review.correct),
                q.correct_option()
            )?;
        }
    }
    Ok(())
}

pub fn stats<W: Write>(out: &mut W, stats: &HistoryStats) -> Result<()> {
    writeln!(
        out,
        "Total quizzes: {}  |  Average score: {}%  |  Questions answered: {}  |  Correct answers: {}",
        stats.total_quizzes, stats.average_percent, stats.total_questions, stats.total_correct
    )?;
    Ok(())
}

pub fn history_entry<W: Write>(out: &mut W, entry: &HistoryEntry) -> Result<()> {
    let band = match entry.score_band() {
        ScoreBand::High => "great",
        ScoreBand::Medium => "good",
        ScoreBand::Low => "keep practicing",
    };
    writeln!(
        out,
        "{}  {} ({})  {}/{} ({}%, {})  time {}",
        format_history_date(&entry.iso_date),
        entry.topic,
        entry.difficulty,
        entry.score,
        entry.total_questions,
        entry.percent(),
        band,
        format_completion(entry.completion_seconds)
    )?;
    Ok(())
}
