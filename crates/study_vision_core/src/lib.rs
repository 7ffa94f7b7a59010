pub mod chat;
pub mod context;
pub mod controller;
pub mod domain;
pub mod merge;
pub mod ports;
pub mod store;

pub use chat::ChatTranscript;
pub use context::build_context;
pub use controller::{title_from_sources, ComposeState, SessionController};
pub use domain::{
    ChatMessage, ChatRole, Difficulty, FillInBlank, Flashcard, Mcq, PracticeQuestion, Session,
    SourceFile, StudyDay, StudyGuide, StudyTask, Theme, TrueFalse,
};
pub use merge::{merge_sessions, merged_title};
pub use ports::{ChatService, FragmentStream, KeyValueStore, PortError, PortResult, StudyGuideGenerator};
pub use store::SessionStore;
