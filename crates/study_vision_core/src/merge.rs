//! crates/study_vision_core/src/merge.rs
//!
//! The merge engine: pure functions that deterministically combine two or
//! more sessions into a single new study guide. The inputs are never
//! modified; the output is an independent deep copy.

use std::collections::BTreeMap;

use crate::domain::{Session, StudyDay, StudyGuide, StudyTask};

/// Builds the title of a merged session: `"Merged: "` plus the source titles
/// joined with `" + "`, in input order.
pub fn merged_title(sessions: &[Session]) -> String {
    let titles: Vec<&str> = sessions.iter().map(|s| s.title.as_str()).collect();
    format!("Merged: {}", titles.join(" + "))
}

/// Combines the study guides of the given sessions into a brand-new guide.
///
/// Returns `None` when fewer than two sessions are supplied; the caller must
/// guard and leave all state untouched in that case.
///
/// The quiz-style fields are flat concatenations in input order with no
/// deduplication or renumbering. The study plan is regrouped by exact `day`
/// value: for each distinct day, tasks are concatenated in input-session
/// order with each description prefixed by its source session's title, and
/// the resulting days are sorted ascending. Day numbering is never
/// normalized across sources with differing plan lengths.
pub fn merge_sessions(sessions: &[Session]) -> Option<StudyGuide> {
    if sessions.len() < 2 {
        return None;
    }

    let summary = sessions
        .iter()
        .map(|s| format!("--- Summary from {} ---\n{}", s.title, s.data.summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    // BTreeMap keeps the grouped days sorted ascending by day index.
    let mut plan_by_day: BTreeMap<u32, Vec<StudyTask>> = BTreeMap::new();
    for session in sessions {
        for day in &session.data.study_plan {
            let tasks = plan_by_day.entry(day.day).or_default();
            for task in &day.tasks {
                tasks.push(StudyTask {
                    time_estimate: task.time_estimate.clone(),
                    description: format!("[{}] {}", session.title, task.description),
                });
            }
        }
    }
    let study_plan = plan_by_day
        .into_iter()
        .map(|(day, tasks)| StudyDay { day, tasks })
        .collect();

    Some(StudyGuide {
        summary,
        mcqs: sessions.iter().flat_map(|s| s.data.mcqs.clone()).collect(),
        flashcards: sessions
            .iter()
            .flat_map(|s| s.data.flashcards.clone())
            .collect(),
        practice_questions: sessions
            .iter()
            .flat_map(|s| s.data.practice_questions.clone())
            .collect(),
        fill_in_the_blanks: sessions
            .iter()
            .flat_map(|s| s.data.fill_in_the_blanks.clone())
            .collect(),
        true_false_questions: sessions
            .iter()
            .flat_map(|s| s.data.true_false_questions.clone())
            .collect(),
        study_plan,
    })
}
