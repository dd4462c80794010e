use serde::{Deserialize, Serialize};

pub const OPTION_COUNT: usize = 4;

/// One generated multiple-choice question. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "question")]
    pub text: String,
    pub options: [String; OPTION_COUNT],
    #[serde(rename = "correctAnswer")]
    pub correct_option_index: usize,
}

impl QuestionRecord {
    pub fn new(text: impl Into<String>, options: [String; OPTION_COUNT], correct: usize) -> Self {
        Self {
            text: text.into(),
            options,
            correct_option_index: correct,
        }
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_option_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_option_index.min(OPTION_COUNT - 1)]
    }
}

/// Letter shown next to an option, `A`..`D`.
pub fn option_label(index: usize) -> char {
    (b'A' + (index as u8)) as char
}

/// Inverse of [`option_label`], case-insensitive.
pub fn option_index_from_label(label: char) -> Option<usize> {
    let upper = label.to_ascii_uppercase();
    if ('A'..='D').contains(&upper) {
        Some((upper as u8 - b'A') as usize)
    } else {
        None
    }
}
