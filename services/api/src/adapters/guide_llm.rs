//! services/api/src/adapters/guide_llm.rs
//!
//! This module contains the adapter for the study-guide generation LLM.
//! It implements the `StudyGuideGenerator` port from the `core` crate. The
//! prompt text and the JSON response schema below are this repository's
//! entire contribution to content generation; everything else is the model's.

const SYSTEM_INSTRUCTIONS: &str =
    "You are a world-class educational content generator designed to help students learn efficiently.";

const PROMPT_TEMPLATE: &str = r#"You are Study Vision, an education assistant.
Task: Analyze the provided notes (image/PDF).
Context/Priorities provided by user: "{focus}"

Constraints:
- Respect user focus/syllabus if provided.
- If handwriting is unclear, make reasonable assumptions based on context.
- Avoid hallucinations; quote or paraphrase only from provided material.
- For equations/definitions, keep LaTeX-friendly formatting where relevant.

Required Output Components:
1. Bullet Summary (max 150 words).
2. 8 MCQs (4 options, rationale).
3. 10 Flashcards.
4. 6 Practice Questions (2 Easy, 2 Med, 2 Hard).
5. 5 Fill-in-the-blank questions.
6. 5 True/False questions.
7. 3-Day Study Plan with Spaced Repetition:
   - Day 1: Focus on new material.
   - Day 2: Review Day 1 material + new material/deeper dive.
   - Day 3: Review Day 1 & 2 material + final synthesis/practice.
   - Provide specific time estimates for each block.

Generate the response strictly according to the JSON schema provided."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs,
        ImageUrlArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;
use study_vision_core::{
    domain::{SourceFile, StudyGuide},
    ports::{PortError, PortResult, StudyGuideGenerator},
};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StudyGuideGenerator` using an OpenAI-compatible
/// multimodal LLM.
#[derive(Clone)]
pub struct OpenAiGuideAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGuideAdapter {
    /// Creates a new `OpenAiGuideAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `StudyGuideGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyGuideGenerator for OpenAiGuideAdapter {
    /// Generates a structured study guide from the uploaded notes.
    ///
    /// Every failure mode (network, refused request, non-JSON reply, schema
    /// violation) collapses into one generic error; no partial guide is ever
    /// returned.
    async fn generate(&self, files: &[SourceFile], focus_hint: &str) -> PortResult<StudyGuide> {
        let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();
        for file in files {
            let data_url = format!(
                "data:{};base64,{}",
                file.mime_type,
                BASE64.encode(&file.bytes)
            );
            let image = ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(
                    ImageUrlArgs::default()
                        .url(data_url)
                        .build()
                        .map_err(|e| PortError::Unexpected(e.to_string()))?,
                )
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            parts.push(image.into());
        }
        let prompt = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(PROMPT_TEMPLATE.replace("{focus}", focus_hint))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        parts.push(prompt.into());

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_INSTRUCTIONS)
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(parts))
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: "study_guide".to_string(),
                    description: Some("A structured study guide".to_string()),
                    schema: Some(study_guide_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Guide generation returned no text content.".to_string())
            })?;

        let guide: StudyGuide = serde_json::from_str(&text).map_err(|e| {
            warn!("Guide generation reply did not match the schema: {}", e);
            PortError::Unexpected(format!("Guide generation reply was malformed: {}", e))
        })?;
        validate_guide(&guide)?;
        Ok(guide)
    }
}

/// Rejects guides that violate the MCQ invariant so a broken guide is never
/// handed to the controller.
fn validate_guide(guide: &StudyGuide) -> PortResult<()> {
    for (i, mcq) in guide.mcqs.iter().enumerate() {
        if mcq.correct_option().is_none() {
            return Err(PortError::Unexpected(format!(
                "MCQ {} has correctOptionIndex {} but only {} options",
                i,
                mcq.correct_option_index,
                mcq.options.len()
            )));
        }
    }
    Ok(())
}

/// The JSON response schema for the generated study guide, mirrored from the
/// camelCase wire shape of the domain types.
fn study_guide_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "summary": {
                "type": "string",
                "description": "A bulleted summary of the material, max 150 words."
            },
            "mcqs": {
                "type": "array",
                "description": "8 Multiple Choice Questions.",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "question": { "type": "string" },
                        "options": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Exactly 4 options."
                        },
                        "correctOptionIndex": {
                            "type": "integer",
                            "description": "Index of the correct option (0-3)."
                        },
                        "rationale": {
                            "type": "string",
                            "description": "1-2 lines explaining why the answer is correct."
                        }
                    },
                    "required": ["question", "options", "correctOptionIndex", "rationale"]
                }
            },
            "flashcards": {
                "type": "array",
                "description": "10 Flashcards.",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "term": { "type": "string" },
                        "definition": { "type": "string" }
                    },
                    "required": ["term", "definition"]
                }
            },
            "practiceQuestions": {
                "type": "array",
                "description": "6 Practice Questions (2 Easy, 2 Medium, 2 Hard).",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "difficulty": { "type": "string", "enum": ["Easy", "Medium", "Hard"] },
                        "question": { "type": "string" },
                        "modelAnswer": { "type": "string", "description": "Succinct model answer." }
                    },
                    "required": ["difficulty", "question", "modelAnswer"]
                }
            },
            "fillInTheBlanks": {
                "type": "array",
                "description": "5 Fill-in-the-blank questions.",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "sentence": {
                            "type": "string",
                            "description": "Sentence with a blank indicated by '______'."
                        },
                        "answer": {
                            "type": "string",
                            "description": "The correct word or phrase to fill the blank."
                        }
                    },
                    "required": ["sentence", "answer"]
                }
            },
            "trueFalseQuestions": {
                "type": "array",
                "description": "5 True/False questions.",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "statement": { "type": "string" },
                        "isTrue": { "type": "boolean" },
                        "rationale": {
                            "type": "string",
                            "description": "Succinct rationale for why it is true or false."
                        }
                    },
                    "required": ["statement", "isTrue", "rationale"]
                }
            },
            "studyPlan": {
                "type": "array",
                "description": "Mini Study Plan for next 3 days.",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "day": { "type": "integer" },
                        "tasks": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "additionalProperties": false,
                                "properties": {
                                    "timeEstimate": { "type": "string", "description": "e.g., '30 mins'" },
                                    "description": { "type": "string" }
                                },
                                "required": ["timeEstimate", "description"]
                            }
                        }
                    },
                    "required": ["day", "tasks"]
                }
            }
        },
        "required": [
            "summary", "mcqs", "flashcards", "practiceQuestions",
            "fillInTheBlanks", "trueFalseQuestions", "studyPlan"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_vision_core::domain::Mcq;

    fn guide_with_mcq(index: usize) -> StudyGuide {
        StudyGuide {
            summary: String::new(),
            mcqs: vec![Mcq {
                question: "q".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_option_index: index,
                rationale: String::new(),
            }],
            flashcards: vec![],
            practice_questions: vec![],
            fill_in_the_blanks: vec![],
            true_false_questions: vec![],
            study_plan: vec![],
        }
    }

    #[test]
    fn out_of_range_correct_option_is_rejected() {
        assert!(validate_guide(&guide_with_mcq(1)).is_ok());
        assert!(validate_guide(&guide_with_mcq(2)).is_err());
    }

    #[test]
    fn schema_names_every_guide_field() {
        let schema = study_guide_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 7);
        assert!(schema["properties"]["mcqs"]["items"]["properties"]["correctOptionIndex"]
            .is_object());
    }
}
