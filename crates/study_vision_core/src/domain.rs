//! crates/study_vision_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend; the serde attributes
//! only pin the camelCase JSON shape shared with the browser client and the
//! persisted session collection.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single multiple-choice question. Holds exactly four options; the
/// invariant `correct_option_index < options.len()` is checked at the
/// generation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
    pub rationale: String,
}

impl Mcq {
    /// The text of the correct option, or `None` if the index is out of range.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_option_index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    pub difficulty: Difficulty,
    pub question: String,
    pub model_answer: String,
}

/// A sentence with a blank placeholder (`______`) and the word or phrase
/// that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillInBlank {
    pub sentence: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalse {
    pub statement: String,
    pub is_true: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTask {
    pub time_estimate: String,
    pub description: String,
}

/// One logical day of the study plan. Day indices are not required to be
/// contiguous, and after a merge the same index can carry tasks from several
/// source sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDay {
    pub day: u32,
    pub tasks: Vec<StudyTask>,
}

/// The full generated content bundle for one set of uploaded materials.
/// Immutable once created; owned exclusively by the session that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGuide {
    pub summary: String,
    pub mcqs: Vec<Mcq>,
    pub flashcards: Vec<Flashcard>,
    pub practice_questions: Vec<PracticeQuestion>,
    pub fill_in_the_blanks: Vec<FillInBlank>,
    pub true_false_questions: Vec<TrueFalse>,
    pub study_plan: Vec<StudyDay>,
}

/// One persisted, named instance of a generated or merged study guide.
/// Created on successful generation or merge, never mutated afterwards,
/// destroyed only by explicit user deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub data: StudyGuide,
}

/// One uploaded notes file, as handed to the generation provider.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub bytes: Bytes,
    pub mime_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// A single message in the study-buddy chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// The persisted appearance preference, the second of the two storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_guide() -> StudyGuide {
        StudyGuide {
            summary: "- Cells are the unit of life".to_string(),
            mcqs: vec![Mcq {
                question: "What is the powerhouse of the cell?".to_string(),
                options: vec![
                    "Nucleus".to_string(),
                    "Mitochondria".to_string(),
                    "Ribosome".to_string(),
                    "Golgi body".to_string(),
                ],
                correct_option_index: 1,
                rationale: "Mitochondria produce ATP.".to_string(),
            }],
            flashcards: vec![],
            practice_questions: vec![],
            fill_in_the_blanks: vec![],
            true_false_questions: vec![],
            study_plan: vec![],
        }
    }

    #[test]
    fn session_json_uses_camel_case_keys() {
        let session = Session {
            id: Uuid::new_v4(),
            title: "Bio".to_string(),
            created_at: Utc::now(),
            data: sample_guide(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"correctOptionIndex\""));
        assert!(json.contains("\"practiceQuestions\""));
        assert!(json.contains("\"fillInTheBlanks\""));
        assert!(json.contains("\"trueFalseQuestions\""));
        assert!(json.contains("\"studyPlan\""));
    }

    #[test]
    fn correct_option_respects_bounds() {
        let mut mcq = sample_guide().mcqs.remove(0);
        assert_eq!(mcq.correct_option(), Some("Mitochondria"));
        mcq.correct_option_index = 4;
        assert_eq!(mcq.correct_option(), None);
    }

    #[test]
    fn theme_round_trips_through_its_storage_text() {
        assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
        assert_eq!(Theme::parse(Theme::Light.as_str()), Some(Theme::Light));
        assert_eq!(Theme::parse("solarized"), None);
    }
}
