use validator::Validate;

use crate::error::Result;
use crate::models::settings::{
    Difficulty, QuizSettings, ViewMode, DEFAULT_MODEL, DEFAULT_QUESTIONS,
};
use crate::utils::validation::{not_blank, validate};

/// Settings as captured from the user, before validation.
#[derive(Debug, Clone, Validate)]
pub struct SettingsInput {
    #[validate(custom(function = "not_blank"))]
    pub topic: String,
    pub difficulty: Difficulty,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(range(
        min = 5,
        max = 20,
        message = "Question count must be between 5 and 20"
    ))]
    pub question_count: usize,
    pub view_mode: ViewMode,
    #[validate(custom(function = "not_blank"))]
    pub api_key: String,
}

impl Default for SettingsInput {
    fn default() -> Self {
        Self {
            topic: String::new(),
            difficulty: Difficulty::default(),
            model: DEFAULT_MODEL.to_string(),
            question_count: DEFAULT_QUESTIONS,
            view_mode: ViewMode::default(),
            api_key: String::new(),
        }
    }
}

impl SettingsInput {
    pub fn into_settings(self) -> Result<QuizSettings> {
        validate(&self)?;

        Ok(QuizSettings {
            topic: self.topic.trim().to_string(),
            difficulty: self.difficulty,
            model: self.model.trim().to_string(),
            question_count: self.question_count,
            view_mode: self.view_mode,
            api_key: self.api_key.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn input() -> SettingsInput {
        SettingsInput {
            topic: "  Ownership  ".into(),
            api_key: "key-123".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_settings_form() {
        let d = SettingsInput::default();
        assert_eq!(d.difficulty, Difficulty::Medium);
        assert_eq!(d.model, "gemini-1.5-flash");
        assert_eq!(d.question_count, 10);
        assert_eq!(d.view_mode, ViewMode::List);
    }

    #[test]
    fn valid_input_is_trimmed() {
        let settings = input().into_settings().unwrap();
        assert_eq!(settings.topic, "Ownership");
        assert_eq!(settings.api_key, "key-123");
    }

    #[test]
    fn blank_topic_is_rejected() {
        let err = SettingsInput {
            topic: "   ".into(),
            ..input()
        }
        .into_settings()
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.user_notification().0, "Topic Required");
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let err = SettingsInput {
            api_key: String::new(),
            ..input()
        }
        .into_settings()
        .unwrap_err();
        assert_eq!(err.user_notification().0, "API Key Required");
    }

    #[test]
    fn question_count_outside_range_is_rejected() {
        let err = SettingsInput {
            question_count: 21,
            ..input()
        }
        .into_settings()
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
