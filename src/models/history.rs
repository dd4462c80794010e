use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::settings::QuizSettings;
use crate::utils::time::{to_iso_string, to_local_display_timestamp};

/// One completed attempt as persisted under `quiz-history`.
///
/// Field names on the wire match what earlier releases wrote, so existing
/// history keeps loading. `completionTime` is absent in entries written
/// before it was tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub topic: String,
    pub difficulty: String,
    pub question_count: usize,
    pub score: usize,
    pub total_questions: usize,
    #[serde(
        rename = "completionTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completion_seconds: Option<u64>,
    #[serde(rename = "date")]
    pub iso_date: String,
    #[serde(rename = "timestamp")]
    pub display_timestamp: String,
}

impl HistoryEntry {
    pub fn record(
        settings: &QuizSettings,
        score: usize,
        total_questions: usize,
        completion_seconds: u64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: at.timestamp_millis(),
            topic: settings.topic.clone(),
            difficulty: settings.difficulty.to_string(),
            question_count: total_questions,
            score,
            total_questions,
            completion_seconds: Some(completion_seconds),
            iso_date: to_iso_string(at),
            display_timestamp: to_local_display_timestamp(at),
        }
    }

    pub fn percent(&self) -> u32 {
        percent_of(self.score, self.total_questions)
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::for_percent(self.percent())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn for_percent(percent: u32) -> Self {
        if percent >= 80 {
            ScoreBand::High
        } else if percent >= 60 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_quizzes: usize,
    pub average_percent: u32,
    pub total_questions: usize,
    pub total_correct: usize,
}

impl HistoryStats {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let ratio_sum: f64 = entries
            .iter()
            .filter(|e| e.total_questions > 0)
            .map(|e| e.score as f64 / e.total_questions as f64)
            .sum();

        Self {
            total_quizzes: entries.len(),
            average_percent: (ratio_sum / entries.len() as f64 * 100.0).round() as u32,
            total_questions: entries.iter().map(|e| e.total_questions).sum(),
            total_correct: entries.iter().map(|e| e.score).sum(),
        }
    }
}

/// Rounded percentage, 0 when `total` is 0.
pub fn percent_of(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
