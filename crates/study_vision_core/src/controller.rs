//! crates/study_vision_core/src/controller.rs
//!
//! The session controller: the single source of truth for which session is
//! active, plus orchestration of create/select/delete/merge over the store
//! and the merge engine. There is exactly one logical writer; callers wrap
//! the controller in a mutex and every mutation is a read-modify-write of
//! the whole collection.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Session, SourceFile, StudyGuide};
use crate::merge::{merge_sessions, merged_title};
use crate::store::SessionStore;

//=========================================================================================
// ComposeState (pending upload draft)
//=========================================================================================

/// The in-progress upload/compose state: files queued for generation plus the
/// optional focus hint. Cleared whenever the user switches away from the
/// compose view (select, delete-current, new session).
#[derive(Debug, Default)]
pub struct ComposeState {
    pub files: Vec<SourceFile>,
    pub focus_hint: String,
}

impl ComposeState {
    fn clear(&mut self) {
        self.files.clear();
        self.focus_hint.clear();
    }
}

//=========================================================================================
// SessionController
//=========================================================================================

pub struct SessionController {
    store: SessionStore,
    /// Newest-first; ids are unique within the collection.
    sessions: Vec<Session>,
    current: Option<Uuid>,
    compose: ComposeState,
}

impl SessionController {
    /// Creates a controller seeded from persisted state.
    pub async fn init(store: SessionStore) -> Self {
        let sessions = store.load().await;
        info!("Loaded {} persisted session(s)", sessions.len());
        Self {
            store,
            sessions,
            current: None,
            compose: ComposeState::default(),
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_session(&self) -> Option<&Session> {
        let id = self.current?;
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
    }

    /// Wraps a freshly generated guide into a new session, prepends it to the
    /// collection and makes it current. Persist failures are logged and
    /// otherwise ignored; the in-memory state stays authoritative.
    pub async fn create_from_generation(&mut self, guide: StudyGuide, title: String) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            title,
            created_at: Utc::now(),
            data: guide,
        };
        self.sessions.insert(0, session.clone());
        self.current = Some(session.id);
        self.compose.clear();
        self.persist().await;
        session
    }

    /// Makes the given session current. A no-op when the id is unknown.
    pub fn select(&mut self, id: Uuid) {
        if self.sessions.iter().any(|s| s.id == id) {
            self.current = Some(id);
            self.compose.clear();
        }
    }

    /// Removes a session from the collection. Deleting the current session
    /// reverts the application to the idle state, exactly like `new_session`.
    /// Deleting an unknown id is a no-op.
    pub async fn delete(&mut self, id: Uuid) {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return;
        }
        if self.current == Some(id) {
            self.current = None;
            self.compose.clear();
        }
        self.persist().await;
    }

    /// Clears the current pointer and any pending compose state without
    /// touching the stored collection.
    pub fn new_session(&mut self) {
        self.current = None;
        self.compose.clear();
    }

    /// Merges the selected sessions into a new session and makes it current.
    ///
    /// Inputs are gathered in collection order (newest-first), mirroring how
    /// the sidebar filters the stored list by membership. Fewer than two
    /// matches are rejected before any state is mutated. Source sessions are
    /// retained; a merge is non-destructive.
    pub async fn merge(&mut self, ids: &[Uuid]) -> Option<Session> {
        let selected: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect();
        let guide = merge_sessions(&selected)?;
        let title = merged_title(&selected);
        Some(self.create_from_generation(guide, title).await)
    }

    // --- Compose draft -------------------------------------------------------------------

    pub fn compose(&self) -> &ComposeState {
        &self.compose
    }

    pub fn push_file(&mut self, file: SourceFile) {
        self.compose.files.push(file);
    }

    pub fn set_focus_hint(&mut self, hint: String) {
        self.compose.focus_hint = hint;
    }

    /// Takes the pending draft for a generation request, leaving the compose
    /// state empty.
    pub fn take_compose(&mut self) -> ComposeState {
        std::mem::take(&mut self.compose)
    }

    pub fn clear_compose(&mut self) {
        self.compose.clear();
    }

    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.sessions).await {
            warn!("Failed to persist session collection: {}", e);
        }
    }
}

/// Derives a session title from the uploaded source filenames: the part of
/// the first filename before its extension, with a `+ N others` suffix when
/// several files were uploaded.
pub fn title_from_sources(files: &[SourceFile]) -> String {
    let main = files
        .first()
        .map(|f| f.file_name.split('.').next().unwrap_or("").trim())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("Untitled Notes")
        .to_string();
    if files.len() > 1 {
        format!("{} + {} others", main, files.len() - 1)
    } else {
        main
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{empty_guide, BrokenKv, InMemoryKv};
    use crate::store::SESSIONS_KEY;
    use bytes::Bytes;
    use std::sync::Arc;

    fn source_file(name: &str) -> SourceFile {
        SourceFile {
            bytes: Bytes::from_static(b"fake"),
            mime_type: "image/png".to_string(),
            file_name: name.to_string(),
        }
    }

    async fn controller_with_kv() -> (SessionController, Arc<InMemoryKv>) {
        let kv = Arc::new(InMemoryKv::default());
        let store = SessionStore::new(kv.clone());
        (SessionController::init(store).await, kv)
    }

    #[tokio::test]
    async fn create_prepends_marks_current_and_persists() {
        let (mut ctl, kv) = controller_with_kv().await;
        ctl.create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        let chem = ctl
            .create_from_generation(empty_guide(), "Chem".to_string())
            .await;

        assert_eq!(ctl.sessions().len(), 2);
        assert_eq!(ctl.sessions()[0].title, "Chem");
        assert_eq!(ctl.sessions()[1].title, "Bio");
        assert_eq!(ctl.current_id(), Some(chem.id));
        assert_eq!(ctl.current_session().unwrap().title, "Chem");

        // Every mutation re-saves the whole collection.
        let raw = kv.raw(SESSIONS_KEY).unwrap();
        assert!(raw.contains("Bio") && raw.contains("Chem"));
    }

    #[tokio::test]
    async fn restart_restores_the_persisted_collection() {
        let kv = Arc::new(InMemoryKv::default());
        {
            let mut ctl = SessionController::init(SessionStore::new(kv.clone())).await;
            ctl.create_from_generation(empty_guide(), "Bio".to_string())
                .await;
        }
        let ctl = SessionController::init(SessionStore::new(kv)).await;
        assert_eq!(ctl.sessions().len(), 1);
        assert_eq!(ctl.sessions()[0].title, "Bio");
        // The current pointer is not persisted; a restart begins idle.
        assert_eq!(ctl.current_id(), None);
    }

    #[tokio::test]
    async fn select_unknown_id_is_a_silent_no_op() {
        let (mut ctl, _kv) = controller_with_kv().await;
        let bio = ctl
            .create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        ctl.select(Uuid::new_v4());
        assert_eq!(ctl.current_id(), Some(bio.id));
    }

    #[tokio::test]
    async fn select_clears_pending_compose_state() {
        let (mut ctl, _kv) = controller_with_kv().await;
        let bio = ctl
            .create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        ctl.new_session();
        ctl.push_file(source_file("notes.png"));
        ctl.set_focus_hint("focus on enzymes".to_string());

        ctl.select(bio.id);
        assert_eq!(ctl.current_id(), Some(bio.id));
        assert!(ctl.compose().files.is_empty());
        assert!(ctl.compose().focus_hint.is_empty());
    }

    #[tokio::test]
    async fn deleting_the_current_session_reverts_to_idle() {
        let (mut ctl, _kv) = controller_with_kv().await;
        let bio = ctl
            .create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        ctl.push_file(source_file("extra.pdf"));

        ctl.delete(bio.id).await;
        assert!(ctl.sessions().is_empty());
        assert_eq!(ctl.current_id(), None);
        assert!(ctl.current_session().is_none());
        assert!(ctl.compose().files.is_empty());
    }

    #[tokio::test]
    async fn deleting_a_non_current_session_leaves_the_current_one_alone() {
        let (mut ctl, _kv) = controller_with_kv().await;
        let bio = ctl
            .create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        let chem = ctl
            .create_from_generation(empty_guide(), "Chem".to_string())
            .await;

        ctl.delete(bio.id).await;
        assert_eq!(ctl.sessions().len(), 1);
        assert_eq!(ctl.current_id(), Some(chem.id));
        assert_eq!(ctl.current_session().unwrap().title, "Chem");
    }

    #[tokio::test]
    async fn delete_unknown_id_changes_nothing() {
        let (mut ctl, kv) = controller_with_kv().await;
        ctl.create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        let snapshot = kv.raw(SESSIONS_KEY).unwrap();

        ctl.delete(Uuid::new_v4()).await;
        assert_eq!(ctl.sessions().len(), 1);
        assert_eq!(kv.raw(SESSIONS_KEY).unwrap(), snapshot);
    }

    #[tokio::test]
    async fn merge_gathers_inputs_in_collection_order() {
        let (mut ctl, _kv) = controller_with_kv().await;
        let bio = ctl
            .create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        let chem = ctl
            .create_from_generation(empty_guide(), "Chem".to_string())
            .await;

        // Ids given oldest-first, but the collection is newest-first.
        let merged = ctl.merge(&[bio.id, chem.id]).await.unwrap();
        assert_eq!(merged.title, "Merged: Chem + Bio");
        assert_eq!(ctl.current_id(), Some(merged.id));

        // Non-destructive: both sources are retained.
        assert_eq!(ctl.sessions().len(), 3);
        assert_eq!(ctl.sessions()[0].id, merged.id);
    }

    #[tokio::test]
    async fn merge_with_fewer_than_two_matches_mutates_nothing() {
        let (mut ctl, kv) = controller_with_kv().await;
        let bio = ctl
            .create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        let snapshot = kv.raw(SESSIONS_KEY).unwrap();

        assert!(ctl.merge(&[bio.id]).await.is_none());
        assert!(ctl.merge(&[bio.id, Uuid::new_v4()]).await.is_none());
        assert_eq!(ctl.sessions().len(), 1);
        assert_eq!(ctl.current_id(), Some(bio.id));
        assert_eq!(kv.raw(SESSIONS_KEY).unwrap(), snapshot);
    }

    #[tokio::test]
    async fn persist_failures_do_not_lose_in_memory_state() {
        let store = SessionStore::new(Arc::new(BrokenKv));
        let mut ctl = SessionController::init(store).await;
        ctl.create_from_generation(empty_guide(), "Bio".to_string())
            .await;
        assert_eq!(ctl.sessions().len(), 1);
        assert!(ctl.current_session().is_some());
    }

    #[test]
    fn titles_derive_from_source_filenames() {
        assert_eq!(title_from_sources(&[]), "Untitled Notes");
        assert_eq!(
            title_from_sources(&[source_file("Photosynthesis.notes.pdf")]),
            "Photosynthesis"
        );
        assert_eq!(
            title_from_sources(&[source_file("Week 3.png"), source_file("scan.pdf")]),
            "Week 3 + 1 others"
        );
        assert_eq!(title_from_sources(&[source_file(".hidden")]), "Untitled Notes");
    }
}
