//! crates/study_vision_core/src/store.rs
//!
//! The session store: durable, ordered persistence of the session collection
//! across application restarts, on top of the injected `KeyValueStore` port.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{Session, Theme};
use crate::ports::{KeyValueStore, PortResult};

/// Storage key for the serialized session collection.
pub const SESSIONS_KEY: &str = "study-vision-sessions";
/// Storage key for the persisted theme preference.
pub const THEME_KEY: &str = "study-vision-theme";

//=========================================================================================
// SessionStore
//=========================================================================================

/// Persists the full session collection as one JSON document under a single
/// key. Every mutation re-saves the entire collection; there is no partial or
/// incremental persistence.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Reads the persisted session collection, newest-first.
    ///
    /// Missing state and corrupt state are both treated as an empty
    /// collection. Corruption is logged but never surfaced; it must not crash
    /// the application.
    pub async fn load(&self) -> Vec<Session> {
        let raw = match self.kv.get(SESSIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read persisted sessions, starting empty: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Session>>(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!("Persisted session data is corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Serializes and persists the full collection. Persistence is best-effort;
    /// the caller logs failures and carries on with its in-memory state.
    pub async fn save(&self, sessions: &[Session]) -> PortResult<()> {
        let raw = serde_json::to_string(sessions)
            .map_err(|e| crate::ports::PortError::Unexpected(e.to_string()))?;
        self.kv.set(SESSIONS_KEY, &raw).await
    }

    /// Reads the persisted theme preference, if any. An unrecognized stored
    /// value is treated the same as no preference.
    pub async fn load_theme(&self) -> Option<Theme> {
        match self.kv.get(THEME_KEY).await {
            Ok(Some(raw)) => Theme::parse(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read persisted theme preference: {}", e);
                None
            }
        }
    }

    pub async fn save_theme(&self, theme: Theme) -> PortResult<()> {
        self.kv.set(THEME_KEY, theme.as_str()).await
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{Flashcard, StudyGuide};
    use crate::ports::PortError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// An in-memory stand-in for browser local storage, shared by the store
    /// and controller tests.
    #[derive(Default)]
    pub(crate) struct InMemoryKv {
        entries: Mutex<HashMap<String, String>>,
    }

    impl InMemoryKv {
        pub(crate) fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub(crate) fn put_raw(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }
    }

    #[async_trait]
    impl KeyValueStore for InMemoryKv {
        async fn get(&self, key: &str) -> PortResult<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> PortResult<()> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    /// A storage backend that fails every call, for the best-effort paths.
    pub(crate) struct BrokenKv;

    #[async_trait]
    impl KeyValueStore for BrokenKv {
        async fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::Unexpected("storage unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Unexpected("storage unavailable".to_string()))
        }
    }

    pub(crate) fn empty_guide() -> StudyGuide {
        StudyGuide {
            summary: String::new(),
            mcqs: vec![],
            flashcards: vec![],
            practice_questions: vec![],
            fill_in_the_blanks: vec![],
            true_false_questions: vec![],
            study_plan: vec![],
        }
    }

    pub(crate) fn session_titled(title: &str) -> Session {
        Session {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: Utc::now(),
            data: empty_guide(),
        }
    }

    #[tokio::test]
    async fn load_returns_empty_when_nothing_is_persisted() {
        let store = SessionStore::new(Arc::new(InMemoryKv::default()));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_preserves_order_ids_and_content() {
        let store = SessionStore::new(Arc::new(InMemoryKv::default()));
        let mut newest = session_titled("Chemistry");
        newest.data.flashcards.push(Flashcard {
            term: "Mole".to_string(),
            definition: "6.022e23 of anything".to_string(),
        });
        let sessions = vec![newest, session_titled("Biology")];

        store.save(&sessions).await.unwrap();
        let loaded = store.load().await;
        assert_eq!(loaded, sessions);
    }

    #[tokio::test]
    async fn corrupt_persisted_state_is_treated_as_empty() {
        let kv = Arc::new(InMemoryKv::default());
        kv.put_raw(SESSIONS_KEY, "{not valid json");
        let store = SessionStore::new(kv);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn storage_read_failure_is_treated_as_empty() {
        let store = SessionStore::new(Arc::new(BrokenKv));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn theme_preference_round_trips() {
        let store = SessionStore::new(Arc::new(InMemoryKv::default()));
        assert_eq!(store.load_theme().await, None);
        store.save_theme(Theme::Dark).await.unwrap();
        assert_eq!(store.load_theme().await, Some(Theme::Dark));
    }

    #[tokio::test]
    async fn unrecognized_theme_value_reads_as_none() {
        let kv = Arc::new(InMemoryKv::default());
        kv.put_raw(THEME_KEY, "sepia");
        let store = SessionStore::new(kv);
        assert_eq!(store.load_theme().await, None);
    }
}
