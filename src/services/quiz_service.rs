use std::sync::Arc;
use std::time::Duration;

use crate::dto::settings_dto::SettingsInput;
use crate::error::Result;
use crate::models::history::HistoryEntry;
use crate::models::settings::QuizSettings;
use crate::quiz::{Clock, QuizSession, SessionTimer};
use crate::services::generation_service::QuestionSource;
use crate::services::history_service::HistoryService;
use crate::services::preferences_service::PreferencesService;

/// Drives quiz attempts: settings -> generation -> answering -> history.
#[derive(Clone)]
pub struct QuizService {
    source: Arc<dyn QuestionSource>,
    history: HistoryService,
    preferences: PreferencesService,
    clock: Arc<dyn Clock>,
    tick: Duration,
}

impl QuizService {
    pub fn new(
        source: Arc<dyn QuestionSource>,
        history: HistoryService,
        preferences: PreferencesService,
        clock: Arc<dyn Clock>,
        tick: Duration,
    ) -> Self {
        Self {
            source,
            history,
            preferences,
            clock,
            tick,
        }
    }

    /// Validates captured settings, remembers the API key and starts an attempt.
    pub async fn begin(&self, input: SettingsInput) -> Result<QuizSession> {
        let settings = input.into_settings()?;
        self.preferences.save_api_key(&settings.api_key).await?;
        self.start(settings).await
    }

    pub async fn start(&self, settings: QuizSettings) -> Result<QuizSession> {
        let session = QuizSession::new(settings, SessionTimer::new(self.clock.clone(), self.tick));
        self.load(session).await
    }

    async fn load(&self, mut session: QuizSession) -> Result<QuizSession> {
        let questions = match self.source.generate(session.settings()).await {
            Ok(questions) => questions,
            Err(e) => {
                tracing::error!(error = %e, topic = %session.settings().topic, "Quiz generation failed");
                return Err(e);
            }
        };
        session.initialize(questions)?;
        Ok(session)
    }

    /// Scores the session and appends its result to history. The session
    /// only becomes `submitted` once the entry is stored, so a failed write
    /// can be retried.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<HistoryEntry> {
        let entry = session.prepare_submission()?;
        let stored = match self.history.append(entry).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save quiz result");
                return Err(e);
            }
        };
        session.complete_submission()?;
        tracing::info!(
            score = stored.score,
            total = stored.total_questions,
            seconds = stored.completion_seconds.unwrap_or(0),
            "Quiz submitted"
        );
        Ok(stored)
    }

    /// Builds a new attempt from the submitted session's settings.
    pub async fn retake(&self, session: &mut QuizSession) -> Result<QuizSession> {
        let fresh = session.retake()?;
        tracing::info!(topic = %fresh.settings().topic, "Retaking quiz");
        self.load(fresh).await
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    pub fn preferences(&self) -> &PreferencesService {
        &self.preferences
    }
}
