use exam_core::model::{PartKey, Question, QuestionId, QuestionStatus};

use crate::provider::PartProvider;
use crate::registry::PartRegistry;

/// One button of the navigation strip: a globally addressable question,
/// colored by its current status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: QuestionId,
    pub display_number: u32,
    pub part: PartKey,
    pub status: QuestionStatus,
}

/// The flat cross-part question index.
///
/// Recomputed on demand rather than cached, because underlying provider
/// data can still be loading; parts that are not ready simply contribute
/// no entries yet. Within a part, questions are ordered by
/// `question_number` ascending regardless of backend arrival order.
#[must_use]
pub fn question_index(registry: &PartRegistry) -> Vec<IndexEntry> {
    let mut entries = Vec::new();
    for part in registry.parts() {
        let Some(slot) = registry.slot(*part) else {
            continue;
        };
        let mut part_questions: Vec<&Question> = slot
            .question_data()
            .iter()
            .flat_map(|group| group.questions().iter())
            .collect();
        part_questions.sort_by_key(|question| question.question_number());

        entries.extend(part_questions.into_iter().map(|question| IndexEntry {
            id: question.id(),
            display_number: question.question_number(),
            part: *part,
            status: registry.status_of(question.id()),
        }));
    }
    entries
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
