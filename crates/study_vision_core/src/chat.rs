//! crates/study_vision_core/src/chat.rs
//!
//! The chat transcript accumulator. Fragments from the streaming provider are
//! applied strictly sequentially to a growing model message; a failed turn
//! never destroys text that already streamed.

use crate::domain::{ChatMessage, ChatRole};

/// The greeting the transcript opens with.
pub const GREETING: &str =
    "Hi! I'm Buddy. I can help you study your notes or answer general questions. What's on your mind?";

/// The fixed apology shown when a turn fails.
pub const FALLBACK_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// The in-memory chat transcript for one connection. One turn may be
/// outstanding at a time; the consumer awaits the fragment stream inline, so
/// fragments are applied in arrival order with no reordering.
#[derive(Debug)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::model(GREETING)],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records the user's message plus an empty model placeholder and returns
    /// the history to replay to the provider (everything before this turn).
    pub fn begin_turn(&mut self, user_text: impl Into<String>) -> Vec<ChatMessage> {
        let history = self.messages.clone();
        self.messages.push(ChatMessage::user(user_text));
        self.messages.push(ChatMessage::model(""));
        history
    }

    /// Appends a received fragment to the open model message.
    pub fn apply_fragment(&mut self, fragment: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Model {
                last.text.push_str(fragment);
            }
        }
    }

    /// Marks the open turn as failed. An empty placeholder is replaced with
    /// the fixed apology; if any text already streamed it is kept intact and
    /// a separate fallback message is appended instead.
    pub fn fail_turn(&mut self) {
        match self.messages.last_mut() {
            Some(last) if last.role == ChatRole::Model && last.text.is_empty() => {
                last.text = FALLBACK_MESSAGE.to_string();
            }
            _ => self.messages.push(ChatMessage::model(FALLBACK_MESSAGE)),
        }
    }
}
