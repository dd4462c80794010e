use quizsmith::database::{pool::create_pool_for, KeyValueStore, SqliteStore};
use quizsmith::models::history::HistoryEntry;
use quizsmith::models::settings::Theme;
use quizsmith::services::history_service::{HistoryService, HISTORY_KEY};
use quizsmith::services::preferences_service::PreferencesService;
use std::sync::Arc;

async fn store() -> Arc<SqliteStore> {
    let pool = create_pool_for("sqlite::memory:").await.expect("pool");
    Arc::new(SqliteStore::new(pool))
}

fn entry(id: i64, topic: &str, score: usize) -> HistoryEntry {
    HistoryEntry {
        id,
        topic: topic.into(),
        difficulty: "medium".into(),
        question_count: 5,
        score,
        total_questions: 5,
        completion_seconds: Some(75),
        iso_date: "2026-02-01T09:30:00.000Z".into(),
        display_timestamp: "2/1/2026, 9:30:00 AM".into(),
    }
}

#[tokio::test]
async fn get_set_remove_round_trip() {
    let store = store().await;
    assert_eq!(store.get("theme").await.unwrap(), None);

    store.set("theme", "light").await.unwrap();
    store.set("theme", "dark").await.unwrap();
    assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));

    store.remove("theme").await.unwrap();
    assert_eq!(store.get("theme").await.unwrap(), None);
}

#[tokio::test]
async fn history_persists_newest_first_and_clears() {
    let store = store().await;
    let history = HistoryService::new(store.clone());

    history.append(entry(10, "Traits", 4)).await.unwrap();
    history.append(entry(20, "Macros", 2)).await.unwrap();

    let entries = history.read_all().await.unwrap();
    assert_eq!(
        entries.iter().map(|e| e.topic.as_str()).collect::<Vec<_>>(),
        vec!["Macros", "Traits"]
    );

    let raw = store.get(HISTORY_KEY).await.unwrap().expect("stored history");
    assert!(raw.contains("\"completionTime\":75"));

    let stats = history.stats().await.unwrap();
    assert_eq!(stats.total_quizzes, 2);
    assert_eq!(stats.average_percent, 60);
    assert_eq!(stats.total_correct, 6);

    history.clear().await.unwrap();
    assert!(history.read_all().await.unwrap().is_empty());
    assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn preferences_persist_in_sqlite() {
    let store = store().await;
    let prefs = PreferencesService::new(store);

    assert_eq!(prefs.theme().await.unwrap(), Theme::Dark);
    prefs.set_theme(Theme::Light).await.unwrap();
    assert_eq!(prefs.theme().await.unwrap(), Theme::Light);

    prefs.save_api_key("AIza-sqlite").await.unwrap();
    assert_eq!(prefs.api_key().await.unwrap().as_deref(), Some("AIza-sqlite"));
}
