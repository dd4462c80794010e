#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: String,
    pub key: Option<String>,
    pub body: JsonValue,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    reply: JsonValue,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct StubGemini {
    pub endpoint: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubGemini {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn generate_content(
    State(state): State<StubState>,
    Path(call): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    state.calls.lock().unwrap().push(RecordedCall {
        call,
        key: params.get("key").cloned(),
        body,
    });
    (state.status, Json(state.reply.clone()))
}

/// Serves `reply` with `status` for every `generateContent` call.
pub async fn spawn_stub(status: StatusCode, reply: JsonValue) -> StubGemini {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        status,
        reply,
        calls: calls.clone(),
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    StubGemini {
        endpoint: format!("http://{}/v1beta/models", addr),
        calls,
    }
}

/// Generate-content envelope whose text is `text`.
pub fn envelope(text: &str) -> JsonValue {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

/// Five questions whose correct options are B, A, C, D, B.
pub fn five_questions_text() -> String {
    let correct = [1, 0, 2, 3, 1];
    let items: Vec<JsonValue> = correct
        .iter()
        .enumerate()
        .map(|(i, c)| {
            json!({
                "question": format!("Ownership question {}?", i + 1),
                "options": ["first", "second", "third", "fourth"],
                "correctAnswer": c
            })
        })
        .collect();
    format!("```json\n{}\n```", serde_json::to_string_pretty(&items).unwrap())
}
