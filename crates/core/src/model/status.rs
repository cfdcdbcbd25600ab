use serde::{Deserialize, Serialize};

/// Per-question progress state, as shown on the navigation strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionStatus {
    #[default]
    Unseen,
    Viewed,
    Answered,
    MarkedForReview,
}

impl QuestionStatus {
    /// Promote `Unseen` to `Viewed`; every other state is left alone.
    #[must_use]
    pub fn viewed(self) -> Self {
        match self {
            QuestionStatus::Unseen => QuestionStatus::Viewed,
            other => other,
        }
    }

    /// Toggle the review mark. Marking remembers nothing about the
    /// prior state beyond answered-ness, mirroring the strip's cosmetic
    /// long-press behavior.
    #[must_use]
    pub fn toggle_marked(self) -> Self {
        match self {
            QuestionStatus::MarkedForReview => QuestionStatus::Viewed,
            _ => QuestionStatus::MarkedForReview,
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(self, QuestionStatus::Answered)
    }
}
