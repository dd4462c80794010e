pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Generative API request failed: {0}")]
    Transport(String),

    #[error("Generative API returned no text")]
    EmptyGeneration,

    #[error("Generated quiz is malformed: {0}")]
    MalformedGeneration(String),

    #[error("Cannot start a quiz without questions")]
    NoQuestions,

    #[error("{} question(s) still unanswered", unanswered.len())]
    IncompleteAnswers { unanswered: Vec<usize> },

    #[error("Quiz has already been submitted")]
    AlreadySubmitted,

    #[error("Quiz has not been submitted yet")]
    NotSubmitted,

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Index out of range: {0}")]
    OutOfRange(String),

    #[error("Stored history could not be parsed: {0}")]
    HistoryParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}

impl Error {
    /// Errors that abort the attempt being generated and send the user back
    /// to settings capture.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::EmptyGeneration
                | Error::MalformedGeneration(_)
                | Error::NoQuestions
        )
    }

    /// Title and description of the notification shown for this error.
    pub fn user_notification(&self) -> (String, String) {
        match self {
            e if e.is_generation_failure() => (
                "Quiz Generation Failed".to_string(),
                "Please check your API key and try again.".to_string(),
            ),
            Error::Validation(errors) => {
                let fields = errors.field_errors();
                if fields.contains_key("topic") {
                    (
                        "Topic Required".to_string(),
                        "Please enter a quiz topic to continue.".to_string(),
                    )
                } else if fields.contains_key("api_key") {
                    (
                        "API Key Required".to_string(),
                        "Please enter your Gemini API key to continue.".to_string(),
                    )
                } else {
                    ("Invalid Settings".to_string(), errors.to_string())
                }
            }
            other => ("Something went wrong".to_string(), other.to_string()),
        }
    }
}
