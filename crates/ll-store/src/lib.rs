//! Bounded local history and favorites
//!
//! Past queries and starred queries, deduplicated and persisted through a
//! durable key-value collaborator. A missing or corrupt persisted record
//! resets the affected list to empty; persistence never fails a mutation.

pub mod kv;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ll_core::KeyValueStore;

pub use kv::{FileStore, MemoryStore};

/// Most recent history entries kept.
const HISTORY_LIMIT: usize = 50;

const HISTORY_KEY: &str = "loglens.history";
const FAVORITES_KEY: &str = "loglens.favorites";

/// One completed query run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation timestamp in epoch milliseconds; doubles as the sort key
    pub id: i64,
    pub query_text: String,
    pub translated_query: String,
    pub result_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// A starred query. Independent of History: unbounded, keyed by text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: i64,
    pub query_text: String,
    pub translated_query: String,
    pub timestamp: DateTime<Utc>,
}

/// History and favorites, backed by the key-value collaborator.
pub struct QueryStore {
    history: Vec<HistoryEntry>,
    favorites: Vec<FavoriteEntry>,
    kv: Arc<dyn KeyValueStore>,
}

fn load_list<T: for<'de> Deserialize<'de>>(kv: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let Some(raw) = kv.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(error) => {
            // Corrupt record: recover locally, never surface as an error
            tracing::warn!(key, %error, "discarding unreadable persisted list");
            Vec::new()
        }
    }
}

impl QueryStore {
    /// Load both lists from the collaborator, tolerating absent or corrupt
    /// records.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let history = load_list(kv.as_ref(), HISTORY_KEY);
        let favorites = load_list(kv.as_ref(), FAVORITES_KEY);
        Self {
            history,
            favorites,
            kv,
        }
    }

    fn persist_history(&self) {
        match serde_json::to_string(&self.history) {
            Ok(raw) => self.kv.set(HISTORY_KEY, &raw),
            Err(error) => tracing::warn!(%error, "failed to serialize history"),
        }
    }

    fn persist_favorites(&self) {
        match serde_json::to_string(&self.favorites) {
            Ok(raw) => self.kv.set(FAVORITES_KEY, &raw),
            Err(error) => tracing::warn!(%error, "failed to serialize favorites"),
        }
    }

    /// Record a completed query. A re-run of the same text replaces the
    /// prior entry and moves it to the front; the list keeps the 50 most
    /// recent runs.
    pub fn record(
        &mut self,
        query_text: &str,
        translated_query: &str,
        result_count: usize,
        now: DateTime<Utc>,
    ) {
        self.history.retain(|entry| entry.query_text != query_text);
        self.history.insert(
            0,
            HistoryEntry {
                id: now.timestamp_millis(),
                query_text: query_text.to_string(),
                translated_query: translated_query.to_string(),
                result_count,
                timestamp: now,
            },
        );
        self.history.truncate(HISTORY_LIMIT);
        self.persist_history();
    }

    /// Add or remove a favorite. Returns whether the query is a favorite
    /// afterwards. Never touches History.
    pub fn toggle_favorite(
        &mut self,
        query_text: &str,
        translated_query: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|entry| entry.query_text != query_text);
        let added = if self.favorites.len() == before {
            self.favorites.insert(
                0,
                FavoriteEntry {
                    id: now.timestamp_millis(),
                    query_text: query_text.to_string(),
                    translated_query: translated_query.to_string(),
                    timestamp: now,
                },
            );
            true
        } else {
            false
        };
        self.persist_favorites();
        added
    }

    pub fn is_favorite(&self, query_text: &str) -> bool {
        self.favorites
            .iter()
            .any(|entry| entry.query_text == query_text)
    }

    /// History entries, most recent first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Favorites, most recently starred first.
    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }
}
