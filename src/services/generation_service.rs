use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use url::Url;

use crate::dto::gemini_dto::{GenerateContentRequest, GenerateContentResponse};
use crate::error::{Error, Result};
use crate::models::question::{QuestionRecord, OPTION_COUNT};
use crate::models::settings::QuizSettings;

/// Produces the question list for a quiz attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, settings: &QuizSettings) -> Result<Vec<QuestionRecord>>;
}

/// Client of the generative-language `generateContent` endpoint.
///
/// One request per call, no retry and no caching.
#[derive(Clone)]
pub struct GenerationService {
    client: Client,
    endpoint: String,
}

impl GenerationService {
    pub fn new(endpoint: String, client: Client) -> Self {
        Self { client, endpoint }
    }

    pub fn build_prompt(settings: &QuizSettings) -> String {
        format!(
            r#"Generate {count} multiple choice questions about {topic} with {difficulty} difficulty level.

Return the response as a valid JSON array with this exact structure:
[
  {{
    "question": "Question text here?",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correctAnswer": 0
  }}
]

Make sure:
- Each question has exactly 4 options
- correctAnswer is the index (0-3) of the correct option
- Questions are clear and unambiguous
- Return only the JSON array, no additional text"#,
            count = settings.question_count,
            topic = settings.topic,
            difficulty = settings.difficulty,
        )
    }

    /// `{endpoint}/{model}:generateContent?key={api_key}`
    pub fn request_url(&self, settings: &QuizSettings) -> Result<Url> {
        let raw = format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            settings.model
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Config(format!("Invalid generative API endpoint {}: {}", raw, e)))?;
        url.query_pairs_mut().append_pair("key", &settings.api_key);
        Ok(url)
    }

    async fn generate_text(&self, settings: &QuizSettings) -> Result<String> {
        let url = self.request_url(settings)?;
        let payload = GenerateContentRequest::from_prompt(Self::build_prompt(settings));

        let res = self.client.post(url).json(&payload).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Generative API rejected the request");
            return Err(Error::Transport(format!("API Error {}: {}", status, text)));
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Unreadable response envelope: {}", e)))?;

        extract_text(&body)
    }
}

#[async_trait]
impl QuestionSource for GenerationService {
    async fn generate(&self, settings: &QuizSettings) -> Result<Vec<QuestionRecord>> {
        tracing::info!(
            topic = %settings.topic,
            difficulty = %settings.difficulty,
            model = %settings.model,
            count = settings.question_count,
            "Requesting quiz generation"
        );

        let text = self.generate_text(settings).await?;
        let questions = parse_questions(&text, settings.question_count)?;

        tracing::info!(received = questions.len(), "Quiz generated");
        Ok(questions)
    }
}

pub fn extract_text(body: &GenerateContentResponse) -> Result<String> {
    body.first_text()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
        .ok_or(Error::EmptyGeneration)
}

/// Removes a surrounding markdown code fence (with or without a language
/// tag) from generated text.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches("json"),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parses generated text into questions.
///
/// The text must hold a non-empty JSON array. Elements that don't have the
/// question shape are dropped; if none survive the generation is rejected.
/// Extra questions beyond `requested` are discarded.
pub fn parse_questions(text: &str, requested: usize) -> Result<Vec<QuestionRecord>> {
    let cleaned = strip_code_fences(text);
    let raw: JsonValue = serde_json::from_str(cleaned)
        .map_err(|e| Error::MalformedGeneration(format!("not valid JSON: {}", e)))?;

    let items = raw
        .as_array()
        .ok_or_else(|| Error::MalformedGeneration("expected a JSON array".to_string()))?;
    if items.is_empty() {
        return Err(Error::MalformedGeneration("empty question list".to_string()));
    }

    let mut questions: Vec<QuestionRecord> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match coerce_question(item) {
            Some(q) => questions.push(q),
            None => tracing::warn!(index = idx, "Dropping generated item without question shape"),
        }
    }

    if questions.is_empty() {
        return Err(Error::MalformedGeneration(
            "no generated item matched the question shape".to_string(),
        ));
    }
    if requested > 0 && questions.len() > requested {
        questions.truncate(requested);
    }
    Ok(questions)
}

fn coerce_question(v: &JsonValue) -> Option<QuestionRecord> {
    let text = v.get("question")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let options: Vec<String> = v
        .get("options")?
        .as_array()?
        .iter()
        .map(|o| o.as_str().map(|s| s.trim().to_string()))
        .collect::<Option<Vec<_>>>()?;
    let options: [String; OPTION_COUNT] = options.try_into().ok()?;

    let correct = v.get("correctAnswer")?.as_u64()? as usize;
    if correct >= OPTION_COUNT {
        return None;
    }

    Some(QuestionRecord::new(text, options, correct))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{Difficulty, ViewMode};

    fn settings() -> QuizSettings {
        QuizSettings {
            topic: "Tokio".into(),
            difficulty: Difficulty::Hard,
            model: "gemini-1.5-pro".into(),
            question_count: 7,
            view_mode: ViewMode::List,
            api_key: "abc 123".into(),
        }
    }

    const TWO_QUESTIONS: &str = r#"[
        {"question": "What spawns a task?", "options": ["spawn", "join", "select", "sleep"], "correctAnswer": 0},
        {"question": "What waits on many futures?", "options": ["spawn", "join", "select", "sleep"], "correctAnswer": 2}
    ]"#;

    #[test]
    fn prompt_embeds_count_topic_and_difficulty() {
        let prompt = GenerationService::build_prompt(&settings());
        assert!(prompt.starts_with("Generate 7 multiple choice questions about Tokio with hard difficulty level."));
        assert!(prompt.contains("\"correctAnswer\": 0"));
        assert!(prompt.contains("Return only the JSON array"));
    }

    #[test]
    fn request_url_carries_model_and_key() {
        let svc = GenerationService::new(
            "https://generativelanguage.googleapis.com/v1beta/models/".into(),
            Client::new(),
        );
        let url = svc.request_url(&settings()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent?key=abc+123"
        );
    }

    #[test]
    fn strips_fences_with_and_without_language_tag() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fences("```json[1]```"), "[1]");
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
    }

    #[test]
    fn parses_fenced_array() {
        let text = format!("```json\n{}\n```", TWO_QUESTIONS);
        let questions = parse_questions(&text, 10).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].correct_option_index, 2);
        assert_eq!(questions[1].correct_option(), "select");
    }

    #[test]
    fn truncates_to_requested_count() {
        let questions = parse_questions(TWO_QUESTIONS, 1).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "What spawns a task?");
    }

    #[test]
    fn rejects_non_array_and_empty_results() {
        assert!(matches!(
            parse_questions(r#"{"questions": []}"#, 5),
            Err(Error::MalformedGeneration(_))
        ));
        assert!(matches!(parse_questions("[]", 5), Err(Error::MalformedGeneration(_))));
        assert!(matches!(
            parse_questions("Sure! Here is your quiz.", 5),
            Err(Error::MalformedGeneration(_))
        ));
    }

    #[test]
    fn drops_items_without_question_shape() {
        let text = r#"[
            {"question": "Three options", "options": ["a", "b", "c"], "correctAnswer": 0},
            {"question": "Bad index", "options": ["a", "b", "c", "d"], "correctAnswer": 4},
            {"options": ["a", "b", "c", "d"], "correctAnswer": 1},
            {"question": "Fine", "options": ["a", "b", "c", "d"], "correctAnswer": 3}
        ]"#;
        let questions = parse_questions(text, 5).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Fine");

        let all_bad = r#"[{"question": "x", "options": [], "correctAnswer": 0}]"#;
        assert!(matches!(parse_questions(all_bad, 5), Err(Error::MalformedGeneration(_))));
    }

    #[test]
    fn envelope_without_text_is_empty_generation() {
        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(extract_text(&empty), Err(Error::EmptyGeneration)));

        let blank: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(extract_text(&blank), Err(Error::EmptyGeneration)));

        let missing: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(extract_text(&missing), Err(Error::EmptyGeneration)));

        let ok: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[]"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(&ok).unwrap(), "[]");
    }
}
