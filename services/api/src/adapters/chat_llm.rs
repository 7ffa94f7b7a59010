//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the streaming study-buddy chat LLM.
//! It implements the `ChatService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS_TEMPLATE: &str = r#"You are "Buddy", a friendly and helpful AI study companion.

PRIORITY CONTEXT (User's Uploaded Material):
{context}

INSTRUCTIONS:
1. PRIORITIZE the provided CONTEXT. If the user asks a question covered by the notes, answer based on the notes.
2. If the answer is not in the context, use your general global knowledge, but acknowledge that it's outside the provided notes if relevant.
3. Be encouraging, concise, and educational.
4. Use Markdown for formatting (bold, italics, lists)."#;

const NO_NOTES_CONTEXT: &str = "No specific notes uploaded yet. Use general knowledge.";

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use study_vision_core::{
    domain::{ChatMessage, ChatRole},
    ports::{ChatService, FragmentStream, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatService` using an OpenAI-compatible
/// streaming chat LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, PortError> {
    match message.role {
        ChatRole::User => Ok(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.text.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        )),
        ChatRole::Model => Ok(ChatCompletionRequestMessage::Assistant(
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.text.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        )),
    }
}

//=========================================================================================
// `ChatService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatService for OpenAiChatAdapter {
    /// Starts one streaming chat turn. The grounding context is spliced into
    /// the system instruction on every call and never stored anywhere.
    async fn stream_reply(
        &self,
        history: &[ChatMessage],
        new_message: &str,
        grounding_context: &str,
    ) -> PortResult<FragmentStream> {
        let context = if grounding_context.is_empty() {
            NO_NOTES_CONTEXT
        } else {
            grounding_context
        };
        let system = SYSTEM_INSTRUCTIONS_TEMPLATE.replace("{context}", context);

        let mut messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?,
        )];
        for message in history {
            messages.push(to_request_message(message)?);
        }
        messages.push(to_request_message(&ChatMessage::user(new_message))?);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut upstream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Each upstream chunk carries at most one content delta; empty deltas
        // (role markers, finish reasons) are skipped. A mid-stream error ends
        // the turn; the stream is not restartable.
        let fragments = async_stream::stream! {
            while let Some(chunk) = upstream.next().await {
                match chunk {
                    Ok(response) => {
                        let delta = response
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|choice| choice.delta.content);
                        if let Some(text) = delta {
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(PortError::Unexpected(e.to_string()));
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(fragments))
    }
}
