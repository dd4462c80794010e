mod common;

use axum::http::StatusCode;
use quizsmith::cli::play::{self, PlayArgs};
use quizsmith::database::{KeyValueStore, MemoryStore};
use quizsmith::models::settings::{Difficulty, ViewMode};
use quizsmith::quiz::ManualClock;
use quizsmith::services::generation_service::GenerationService;
use quizsmith::AppState;
use reqwest::Client;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

fn app(endpoint: &str) -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let source = GenerationService::new(endpoint.to_string(), Client::new());
    let state = AppState::with_source(
        store.clone(),
        Arc::new(source),
        Arc::new(ManualClock::at_millis(1_767_225_600_000)),
        Duration::from_secs(1),
        None,
    );
    (store, state)
}

fn args(view: ViewMode, api_key: Option<&str>) -> PlayArgs {
    PlayArgs {
        topic: Some("Ownership".into()),
        difficulty: Difficulty::Easy,
        model: "gemini-1.5-flash".into(),
        count: "5".into(),
        view,
        api_key: api_key.map(str::to_string),
    }
}

async fn play(state: &AppState, args: PlayArgs, script: &str) -> String {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut out = Vec::new();
    play::run(state, args, &mut input, &mut out)
        .await
        .expect("play run");
    String::from_utf8(out).expect("utf8 output")
}

#[tokio::test]
async fn list_mode_attempt_is_scored_and_saved() {
    let stub = common::spawn_stub(StatusCode::OK, common::envelope(&common::five_questions_text())).await;
    let (_, state) = app(&stub.endpoint);

    let output = play(
        &state,
        args(ViewMode::List, Some("test-key")),
        "1b\n2a\n3a\n4d\n5c\ns\nn\n",
    )
    .await;

    assert!(output.contains("Ownership question 5?"));
    assert!(output.contains("You scored 3/5 in 0:00"));
    assert!(output.contains("60% Correct"));

    let history = state.history_service.read_all().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 3);
    assert_eq!(history[0].total_questions, 5);
    assert_eq!(history[0].topic, "Ownership");
    assert_eq!(history[0].difficulty, "easy");
    assert_eq!(history[0].completion_seconds, Some(0));

    assert_eq!(
        state.preferences_service.api_key().await.unwrap().as_deref(),
        Some("test-key")
    );
}

#[tokio::test]
async fn incomplete_submission_is_refused() {
    let stub = common::spawn_stub(StatusCode::OK, common::envelope(&common::five_questions_text())).await;
    let (_, state) = app(&stub.endpoint);

    let output = play(&state, args(ViewMode::List, Some("test-key")), "1b\ns\nq\n").await;

    assert!(output.contains("unanswered: 2, 3, 4, 5"));
    assert!(output.contains("Quiz abandoned."));
    assert!(state.history_service.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn single_mode_retake_adds_an_independent_entry() {
    let stub = common::spawn_stub(StatusCode::OK, common::envelope(&common::five_questions_text())).await;
    let (_, state) = app(&stub.endpoint);

    let script = "b\na\na\nd\nc\ns\ny\nb\na\nc\nd\nb\ns\nn\n";
    let output = play(&state, args(ViewMode::Single, Some("test-key")), script).await;

    assert!(output.contains("Question 1 / 5  (20%)"));
    assert!(output.contains("You scored 3/5"));
    assert!(output.contains("You scored 5/5"));
    assert_eq!(stub.calls().len(), 2);

    let history = state.history_service.read_all().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].score, 5);
    assert_eq!(history[1].score, 3);
    assert!(history[0].id > history[1].id);
}

#[tokio::test]
async fn generation_failure_returns_to_settings() {
    let stub = common::spawn_stub(
        StatusCode::FORBIDDEN,
        json!({ "error": { "message": "API key not valid" } }),
    )
    .await;
    let (_, state) = app(&stub.endpoint);

    let output = play(&state, args(ViewMode::List, Some("bad-key")), "").await;

    assert!(output.contains("Quiz Generation Failed: Please check your API key and try again."));
    assert!(state.history_service.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_api_key_is_reported_before_any_request() {
    let stub = common::spawn_stub(StatusCode::OK, common::envelope(&common::five_questions_text())).await;
    let (_, state) = app(&stub.endpoint);

    let output = play(&state, args(ViewMode::List, None), "").await;

    assert!(output.contains("API Key Required"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn stored_api_key_is_reused() {
    let stub = common::spawn_stub(StatusCode::OK, common::envelope(&common::five_questions_text())).await;
    let (store, state) = app(&stub.endpoint);
    store.set("gemini-api-key", "remembered-key").await.unwrap();

    play(&state, args(ViewMode::List, None), "q\n").await;

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].key.as_deref(), Some("remembered-key"));
}

#[tokio::test]
async fn unreadable_history_still_shows_the_result() {
    let stub = common::spawn_stub(StatusCode::OK, common::envelope(&common::five_questions_text())).await;
    let (store, state) = app(&stub.endpoint);
    store.set("quiz-history", "{not json").await.unwrap();

    let output = play(
        &state,
        args(ViewMode::List, Some("test-key")),
        "1b\n2a\n3a\n4d\n5c\ns\nn\nn\n",
    )
    .await;

    assert!(output.contains("Could not save the result to history"));
    assert!(output.contains("quizsmith history clear"));
    assert!(output.contains("You scored 3/5 in 0:00"));
    assert_eq!(
        store.get("quiz-history").await.unwrap().as_deref(),
        Some("{not json")
    );
}
