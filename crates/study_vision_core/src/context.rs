//! crates/study_vision_core/src/context.rs
//!
//! The chat context builder: turns the current study guide into the bounded
//! grounding text handed to the chat provider on every turn. The block is
//! recomputed from the current session on each send and never persisted.

use crate::domain::StudyGuide;

/// Builds the fixed-format grounding block for the study-buddy chat.
///
/// Returns an empty string when no guide is active. Otherwise the block
/// carries the summary, every `term: definition` pair in flashcard order and
/// every question/correct-answer/rationale triple in MCQ order.
pub fn build_context(guide: Option<&StudyGuide>) -> String {
    let Some(guide) = guide else {
        return String::new();
    };

    let terms = guide
        .flashcards
        .iter()
        .map(|f| format!("{}: {}", f.term, f.definition))
        .collect::<Vec<_>>()
        .join("\n");

    let quiz = guide
        .mcqs
        .iter()
        .map(|m| {
            format!(
                "Q: {}\nA: {}\nRationale: {}",
                m.question,
                m.correct_option().unwrap_or(""),
                m.rationale
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "SUMMARY OF NOTES:\n{}\n\nKEY TERMS & DEFINITIONS:\n{}\n\nQUIZ CONTENT:\n{}",
        guide.summary, terms, quiz
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Flashcard, Mcq};
    use crate::store::tests::empty_guide;

    #[test]
    fn no_active_guide_yields_empty_context() {
        assert_eq!(build_context(None), "");
    }

    #[test]
    fn context_contains_every_flashcard_term_verbatim() {
        let mut guide = empty_guide();
        guide.flashcards = vec![
            Flashcard {
                term: "Osmosis".to_string(),
                definition: "diffusion of water".to_string(),
            },
            Flashcard {
                term: "Active transport".to_string(),
                definition: "movement against the gradient".to_string(),
            },
        ];
        let context = build_context(Some(&guide));
        for card in &guide.flashcards {
            assert!(context.contains(&card.term));
        }
        assert!(context.contains("Osmosis: diffusion of water"));
    }

    #[test]
    fn quiz_lines_carry_the_correct_option_text() {
        let mut guide = empty_guide();
        guide.summary = "- membranes".to_string();
        guide.mcqs = vec![Mcq {
            question: "Which way does water move in osmosis?".to_string(),
            options: vec![
                "Toward lower solute concentration".to_string(),
                "Toward higher solute concentration".to_string(),
                "Randomly".to_string(),
                "It does not move".to_string(),
            ],
            correct_option_index: 1,
            rationale: "Water follows the solute.".to_string(),
        }];
        let context = build_context(Some(&guide));
        assert!(context.starts_with("SUMMARY OF NOTES:\n- membranes"));
        assert!(context.contains("A: Toward higher solute concentration"));
        assert!(context.contains("Rationale: Water follows the solute."));
    }
}
