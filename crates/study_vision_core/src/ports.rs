//! crates/study_vision_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like browser storage
//! or the generative-content API.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::domain::{ChatMessage, SourceFile, StudyGuide};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network,
/// malformed provider responses). Every provider failure collapses into one of these
/// variants; callers surface a single retry-able error state to the user.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// A lazy sequence of text fragments from the streaming chat provider.
/// Finite per turn, not restartable mid-stream.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, PortError>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The persistent key-value storage backing the session store. Scoped to exactly
/// two keys: the serialized session collection and the theme preference.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
}

/// The generative-content provider, consumed as an opaque function returning a
/// structured study guide.
#[async_trait]
pub trait StudyGuideGenerator: Send + Sync {
    /// Produces a study guide from the uploaded notes files. Any failure
    /// (network, malformed response, schema violation) is reported as a single
    /// generic generation error.
    async fn generate(&self, files: &[SourceFile], focus_hint: &str) -> PortResult<StudyGuide>;
}

/// The streaming chat provider behind the study-buddy companion.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Starts one chat turn and returns the incremental reply fragments.
    /// `grounding_context` is passed verbatim on every turn and never persisted.
    async fn stream_reply(
        &self,
        history: &[ChatMessage],
        new_message: &str,
        grounding_context: &str,
    ) -> PortResult<FragmentStream>;
}
