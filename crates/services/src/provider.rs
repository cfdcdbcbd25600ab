use std::collections::HashMap;

use chrono::{DateTime, Utc};

use exam_core::model::{Question, QuestionGroup, QuestionId, QuestionStatus};

use crate::error::ProviderError;

/// Read contract every part exposes to the registry, the question
/// index, and the submission aggregator, regardless of its internal
/// question shape.
pub trait PartProvider {
    /// The user's selected option labels, keyed by question id.
    fn answers(&self) -> HashMap<QuestionId, String>;

    /// Per-question progress, keyed by question id.
    fn question_status(&self) -> HashMap<QuestionId, QuestionStatus>;

    /// Snapshot of seconds spent in this part (`now - started_at`),
    /// computed at call time rather than continuously updated.
    fn duration_seconds(&self, now: DateTime<Utc>) -> u64;

    /// The full loaded dataset for this part.
    fn question_data(&self) -> &[QuestionGroup];
}

/// Outcome of an answer selection, used to propagate the status change
/// to the registry's shared map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerEffect {
    /// Re-applying the same selection; nothing to propagate.
    Unchanged,
    Updated(QuestionStatus),
}

/// The loaded state of one part: its question groups plus the answer
/// and status maps accumulated while the user works through it.
///
/// Survives the user switching to a different part and back; it is only
/// dropped when the whole session ends.
#[derive(Debug, Clone)]
pub struct PartData {
    groups: Vec<QuestionGroup>,
    answers: HashMap<QuestionId, String>,
    status: HashMap<QuestionId, QuestionStatus>,
    started_at: DateTime<Utc>,
}

impl PartData {
    /// `started_at` is captured when the part's data finishes loading.
    #[must_use]
    pub fn new(groups: Vec<QuestionGroup>, started_at: DateTime<Utc>) -> Self {
        let status = groups
            .iter()
            .flat_map(QuestionGroup::question_ids)
            .map(|id| (id, QuestionStatus::Unseen))
            .collect();
        Self {
            groups,
            answers: HashMap::new(),
            status,
            started_at,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.groups
            .iter()
            .flat_map(|group| group.questions().iter())
            .find(|question| question.id() == id)
    }

    fn owns(&self, id: QuestionId) -> bool {
        self.status.contains_key(&id)
    }

    /// Record an answer selection for `id`.
    ///
    /// `Some(label)` writes the answer and marks the question answered;
    /// `None` clears it and drops the status back to viewed. Selecting
    /// the label already recorded is a no-op in effect: no map write,
    /// no status transition, nothing to propagate.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::UnknownQuestion` for ids this part does
    /// not own (answers keys stay a subset of the part's question ids).
    pub fn select_answer(
        &mut self,
        id: QuestionId,
        label: Option<&str>,
    ) -> Result<AnswerEffect, ProviderError> {
        if !self.owns(id) {
            return Err(ProviderError::UnknownQuestion(id));
        }

        match label {
            Some(label) => {
                if self.answers.get(&id).is_some_and(|prev| prev == label) {
                    return Ok(AnswerEffect::Unchanged);
                }
                self.answers.insert(id, label.to_string());
                self.status.insert(id, QuestionStatus::Answered);
                Ok(AnswerEffect::Updated(QuestionStatus::Answered))
            }
            None => {
                if self.answers.remove(&id).is_none() {
                    return Ok(AnswerEffect::Unchanged);
                }
                self.status.insert(id, QuestionStatus::Viewed);
                Ok(AnswerEffect::Updated(QuestionStatus::Viewed))
            }
        }
    }

    /// Promote the question to viewed if it was unseen.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::UnknownQuestion` for ids this part does
    /// not own.
    pub fn mark_viewed(&mut self, id: QuestionId) -> Result<QuestionStatus, ProviderError> {
        let status = self
            .status
            .get_mut(&id)
            .ok_or(ProviderError::UnknownQuestion(id))?;
        *status = status.viewed();
        Ok(*status)
    }

    /// Toggle the cosmetic marked-for-review flag.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::UnknownQuestion` for ids this part does
    /// not own.
    pub fn toggle_marked(&mut self, id: QuestionId) -> Result<QuestionStatus, ProviderError> {
        let status = self
            .status
            .get_mut(&id)
            .ok_or(ProviderError::UnknownQuestion(id))?;
        *status = status.toggle_marked();
        Ok(*status)
    }
}

impl PartProvider for PartData {
    fn answers(&self) -> HashMap<QuestionId, String> {
        self.answers.clone()
    }

    fn question_status(&self) -> HashMap<QuestionId, QuestionStatus> {
        self.status.clone()
    }

    fn duration_seconds(&self, now: DateTime<Utc>) -> u64 {
        let delta = now.signed_duration_since(self.started_at).num_seconds();
        u64::try_from(delta).unwrap_or(0)
    }

    fn question_data(&self) -> &[QuestionGroup] {
        &self.groups
    }
}

//
// ─── LOAD STATE ────────────────────────────────────────────────────────────────
//

/// Load state of one selected part. A failed part keeps its message and
/// retry affordance; the rest of the session is unaffected.
#[derive(Debug, Clone)]
pub enum PartSlot {
    Loading,
    Ready(PartData),
    Failed { message: String },
}

impl PartSlot {
    #[must_use]
    pub fn data(&self) -> Option<&PartData> {
        match self {
            PartSlot::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut PartData> {
        match self {
            PartSlot::Ready(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            PartSlot::Failed { message } => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, PartSlot::Ready(_))
    }
}

/// A slot that never finished loading contributes empty answers and
/// status, zero duration, and no question data; submission degrades
/// instead of blocking.
impl PartProvider for PartSlot {
    fn answers(&self) -> HashMap<QuestionId, String> {
        self.data().map(PartProvider::answers).unwrap_or_default()
    }

    fn question_status(&self) -> HashMap<QuestionId, QuestionStatus> {
        self.data()
            .map(PartProvider::question_status)
            .unwrap_or_default()
    }

    fn duration_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.data().map_or(0, |data| data.duration_seconds(now))
    }

    fn question_data(&self) -> &[QuestionGroup] {
        self.data().map_or(&[], PartProvider::question_data)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use exam_core::model::{AnswerOption, GroupContent};
    use exam_core::time::fixed_now;

    fn question(id: u64, number: u32, correct: &str) -> Question {
        let options = ["A", "B", "C"]
            .into_iter()
            .map(|label| AnswerOption::new(label, format!("opt {label}"), label == correct))
            .collect();
        Question::new(QuestionId::new(id), number, None, options, correct).unwrap()
    }

    fn loaded_part() -> PartData {
        let group = QuestionGroup::new(
            GroupContent::Media {
                audio: None,
                image: None,
            },
            vec![question(101, 1, "A"), question(102, 2, "B")],
        );
        PartData::new(vec![group], fixed_now())
    }

    #[test]
    fn new_part_starts_unseen_with_no_answers() {
        let part = loaded_part();
        assert!(part.answers().is_empty());
        assert_eq!(
            part.question_status().get(&QuestionId::new(101)),
            Some(&QuestionStatus::Unseen)
        );
    }

    #[test]
    fn selecting_an_answer_marks_the_question_answered() {
        let mut part = loaded_part();
        let effect = part.select_answer(QuestionId::new(101), Some("A")).unwrap();
        assert_eq!(effect, AnswerEffect::Updated(QuestionStatus::Answered));
        assert_eq!(
            part.answers().get(&QuestionId::new(101)),
            Some(&"A".to_string())
        );
    }

    #[test]
    fn reselecting_the_same_label_is_a_no_op() {
        let mut part = loaded_part();
        part.select_answer(QuestionId::new(101), Some("A")).unwrap();
        let effect = part.select_answer(QuestionId::new(101), Some("A")).unwrap();
        assert_eq!(effect, AnswerEffect::Unchanged);
        assert_eq!(part.answers().len(), 1);
        assert_eq!(
            part.question_status().get(&QuestionId::new(101)),
            Some(&QuestionStatus::Answered)
        );
    }

    #[test]
    fn clearing_an_answer_drops_status_to_viewed() {
        let mut part = loaded_part();
        part.select_answer(QuestionId::new(101), Some("A")).unwrap();
        let effect = part.select_answer(QuestionId::new(101), None).unwrap();
        assert_eq!(effect, AnswerEffect::Updated(QuestionStatus::Viewed));
        assert!(part.answers().is_empty());
    }

    #[test]
    fn rejects_questions_from_other_parts() {
        let mut part = loaded_part();
        let err = part.select_answer(QuestionId::new(999), Some("A")).unwrap_err();
        assert_eq!(err, ProviderError::UnknownQuestion(QuestionId::new(999)));
    }

    #[test]
    fn duration_is_a_snapshot_of_elapsed_seconds() {
        let part = loaded_part();
        let later = fixed_now() + Duration::seconds(95);
        assert_eq!(part.duration_seconds(later), 95);
        // not continuously updated: asking again with the same now gives the same value
        assert_eq!(part.duration_seconds(later), 95);
    }

    #[test]
    fn unloaded_slots_contribute_nothing() {
        let slot = PartSlot::Loading;
        assert!(slot.answers().is_empty());
        assert!(slot.question_status().is_empty());
        assert_eq!(slot.duration_seconds(fixed_now()), 0);
        assert!(slot.question_data().is_empty());

        let failed = PartSlot::Failed {
            message: "network down".into(),
        };
        assert_eq!(failed.error_message(), Some("network down"));
        assert!(failed.answers().is_empty());
    }
}
