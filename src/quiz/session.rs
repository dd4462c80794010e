use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::history::{percent_of, HistoryEntry};
use crate::models::question::{QuestionRecord, OPTION_COUNT};
use crate::models::settings::QuizSettings;
use crate::quiz::timer::SessionTimer;
use crate::utils::time::format_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    Answering,
    Submitted,
}

/// Outcome of one question after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub index: usize,
    pub chosen: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
}

/// One quiz attempt: `loading -> answering -> submitted`.
///
/// `submitted` is terminal. A retake produces a brand-new session in
/// `loading` with the same settings instead of resetting this one.
#[derive(Debug)]
pub struct QuizSession {
    settings: QuizSettings,
    questions: Vec<QuestionRecord>,
    answers: Vec<Option<usize>>,
    current_index: usize,
    status: SessionStatus,
    score: Option<usize>,
    timer: SessionTimer,
}

impl QuizSession {
    pub fn new(settings: QuizSettings, timer: SessionTimer) -> Self {
        Self {
            settings,
            questions: Vec::new(),
            answers: Vec::new(),
            current_index: 0,
            status: SessionStatus::Loading,
            score: None,
            timer,
        }
    }

    /// Installs the generated questions and starts the timer.
    pub fn initialize(&mut self, questions: Vec<QuestionRecord>) -> Result<()> {
        if self.status != SessionStatus::Loading {
            return Err(Error::InvalidState(format!(
                "cannot initialize a session that is {:?}",
                self.status
            )));
        }
        if questions.is_empty() {
            return Err(Error::NoQuestions);
        }

        self.answers = vec![None; questions.len()];
        self.questions = questions;
        self.current_index = 0;
        self.status = SessionStatus::Answering;
        self.timer.start();
        Ok(())
    }

    /// Records (or overwrites) the chosen option for a question. Ignored once
    /// the session has been submitted.
    pub fn select_answer(&mut self, question_index: usize, option_index: usize) -> Result<()> {
        match self.status {
            SessionStatus::Submitted => {
                tracing::debug!(question_index, "Ignoring answer on a submitted quiz");
                return Ok(());
            }
            SessionStatus::Loading => {
                return Err(Error::InvalidState(
                    "questions are still being generated".to_string(),
                ))
            }
            SessionStatus::Answering => {}
        }
        if question_index >= self.questions.len() {
            return Err(Error::OutOfRange(format!(
                "question {} of {}",
                question_index,
                self.questions.len()
            )));
        }
        if option_index >= OPTION_COUNT {
            return Err(Error::OutOfRange(format!("option {}", option_index)));
        }

        self.answers[question_index] = Some(option_index);
        Ok(())
    }

    /// Moves to the next question, staying put on the last one.
    pub fn advance(&mut self) -> usize {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
        self.current_index
    }

    /// Moves to the previous question, staying put on the first one.
    pub fn retreat(&mut self) -> usize {
        self.current_index = self.current_index.saturating_sub(1);
        self.current_index
    }

    /// Stops the timer, scores the attempt and returns the history record
    /// describing it. Every question must be answered.
    pub fn submit(&mut self) -> Result<HistoryEntry> {
        let entry = self.prepare_submission()?;
        self.complete_submission()?;
        Ok(entry)
    }

    /// First half of `submit`: fixes the completion time and builds the
    /// history record while the session stays in `answering`. Calling it
    /// again after a failed save yields the same completion time.
    pub fn prepare_submission(&mut self) -> Result<HistoryEntry> {
        self.ensure_submittable()?;
        let completion_seconds = self.timer.stop();
        Ok(HistoryEntry::record(
            &self.settings,
            self.grade(),
            self.questions.len(),
            completion_seconds,
            self.timer.now(),
        ))
    }

    /// Second half of `submit`: records the score and moves to `submitted`.
    pub fn complete_submission(&mut self) -> Result<usize> {
        self.ensure_submittable()?;
        self.timer.stop();
        let score = self.grade();
        self.score = Some(score);
        self.status = SessionStatus::Submitted;
        Ok(score)
    }

    fn grade(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.is_some_and(|chosen| q.is_correct(chosen)))
            .count()
    }

    fn ensure_submittable(&self) -> Result<()> {
        match self.status {
            SessionStatus::Submitted => return Err(Error::AlreadySubmitted),
            SessionStatus::Loading => {
                return Err(Error::InvalidState(
                    "cannot submit before questions are loaded".to_string(),
                ))
            }
            SessionStatus::Answering => {}
        }
        let unanswered = self.unanswered();
        if !unanswered.is_empty() {
            return Err(Error::IncompleteAnswers { unanswered });
        }
        Ok(())
    }

    /// Discards this attempt's timing and returns a fresh session in
    /// `loading` with the original settings.
    pub fn retake(&mut self) -> Result<QuizSession> {
        if self.status != SessionStatus::Submitted {
            return Err(Error::NotSubmitted);
        }
        self.timer.reset();
        Ok(QuizSession::new(self.settings.clone(), self.timer.fresh()))
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn score(&self) -> Option<usize> {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.questions.get(self.current_index)
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    pub fn completion_seconds(&self) -> Option<u64> {
        self.timer.completion_seconds()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn unanswered(&self) -> Vec<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.is_none().then_some(i))
            .collect()
    }

    pub fn all_answered(&self) -> bool {
        !self.answers.is_empty() && self.answers.iter().all(Option::is_some)
    }

    /// Position of the current question in single-question mode, in percent.
    pub fn progress_percent(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        percent_of(self.current_index + 1, self.questions.len())
    }

    pub fn percent_correct(&self) -> Option<u32> {
        self.score.map(|s| percent_of(s, self.questions.len()))
    }

    pub fn review(&self) -> Vec<QuestionReview> {
        if self.status != SessionStatus::Submitted {
            return Vec::new();
        }
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(index, (q, chosen))| QuestionReview {
                index,
                chosen: *chosen,
                correct: q.correct_option_index,
                is_correct: chosen.is_some_and(|c| q.is_correct(c)),
            })
            .collect()
    }

    /// "You scored S/N in M:SS", available once submitted.
    pub fn completion_message(&self) -> Option<String> {
        let score = self.score?;
        Some(format!(
            "You scored {}/{} in {}",
            score,
            self.questions.len(),
            format_clock(self.completion_seconds().unwrap_or(0))
        ))
    }
}
