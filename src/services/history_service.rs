use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::database::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::history::{HistoryEntry, HistoryStats};

pub const HISTORY_KEY: &str = "quiz-history";

/// Append-only record of completed attempts, newest first.
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Puts `entry` in front of the existing entries and returns it as stored.
    /// Its id is bumped past the largest existing id if needed, so ids stay
    /// unique and increasing.
    ///
    /// Stored items are carried over verbatim, including ones that no longer
    /// decode as entries. Stored text that is not a JSON array is left
    /// untouched and reported as `HistoryParse`.
    pub async fn append(&self, mut entry: HistoryEntry) -> Result<HistoryEntry> {
        let mut items = match self.store.get(HISTORY_KEY).await? {
            Some(raw) => decode_items(&raw)?,
            None => Vec::new(),
        };

        if let Some(largest) = items.iter().filter_map(|v| v.get("id")?.as_i64()).max() {
            if entry.id <= largest {
                entry.id = largest + 1;
            }
        }

        items.insert(0, serde_json::to_value(&entry)?);
        let encoded = serde_json::to_string(&items)?;
        self.store.set(HISTORY_KEY, &encoded).await?;

        tracing::info!(
            id = entry.id,
            topic = %entry.topic,
            score = entry.score,
            total = entry.total_questions,
            "Saved quiz result to history"
        );
        Ok(entry)
    }

    /// All readable entries, newest first. Unparseable stored history reads
    /// as empty.
    pub async fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match decode_history(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable quiz history");
                Ok(Vec::new())
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(HISTORY_KEY).await?;
        tracing::info!("Quiz history cleared");
        Ok(())
    }

    pub async fn stats(&self) -> Result<HistoryStats> {
        let entries = self.read_all().await?;
        Ok(HistoryStats::from_entries(&entries))
    }
}

fn decode_items(raw: &str) -> Result<Vec<JsonValue>> {
    serde_json::from_str(raw).map_err(|e| Error::HistoryParse(e.to_string()))
}

/// Decodes stored history. The text must be a JSON array; items that don't
/// have the entry shape are skipped so the rest stay visible.
pub fn decode_history(raw: &str) -> Result<Vec<HistoryEntry>> {
    let items = decode_items(raw)?;
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "Skipping unreadable history entry");
                None
            }
        })
        .collect())
}
