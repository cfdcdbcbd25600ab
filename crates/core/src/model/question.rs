use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::QuestionId;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id} has {count} options marked correct, expected exactly one")]
    CorrectCountMismatch { id: QuestionId, count: usize },

    #[error("question {id}: correct answer '{expected}' does not match the correct option '{found}'")]
    CorrectLabelMismatch {
        id: QuestionId,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("media URI cannot be empty")]
    Empty,

    #[error("media URI is not a valid URL: {0}")]
    InvalidUrl(String),
}

//
// ─── MEDIA ─────────────────────────────────────────────────────────────────────
//

/// A hosted media resource attached to a question group (audio clip or
/// photograph), always served by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaUri(Url);

impl MediaUri {
    /// # Errors
    ///
    /// Returns `MediaError` if the string is empty or not a valid URL.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaError::Empty);
        }
        let url = Url::parse(s).map_err(|_| MediaError::InvalidUrl(s.to_string()))?;
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub text: String,
    pub is_correct: bool,
}

impl AnswerOption {
    #[must_use]
    pub fn new(label: impl Into<String>, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            is_correct,
        }
    }
}

/// A single exam question.
///
/// `question_number` is the exam-visible ordinal used for sorting and
/// display; it is not guaranteed to equal the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    question_number: u32,
    prompt: Option<String>,
    options: Vec<AnswerOption>,
    correct_answer: String,
}

impl Question {
    /// Build a question, enforcing that exactly one option is marked
    /// correct and that its label matches `correct_answer`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the correctness invariant is violated.
    pub fn new(
        id: QuestionId,
        question_number: u32,
        prompt: Option<String>,
        options: Vec<AnswerOption>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let correct_answer = correct_answer.into();

        if options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }

        let correct: Vec<&AnswerOption> = options.iter().filter(|o| o.is_correct).collect();
        if correct.len() != 1 {
            return Err(QuestionError::CorrectCountMismatch {
                id,
                count: correct.len(),
            });
        }
        if correct[0].label != correct_answer {
            return Err(QuestionError::CorrectLabelMismatch {
                id,
                expected: correct_answer,
                found: correct[0].label.clone(),
            });
        }

        Ok(Self {
            id,
            question_number,
            prompt,
            options,
            correct_answer,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn question_number(&self) -> u32 {
        self.question_number
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// True if the given label is the canonical correct answer.
    #[must_use]
    pub fn is_correct(&self, label: &str) -> bool {
        self.correct_answer == label
    }
}

//
// ─── QUESTION GROUP ────────────────────────────────────────────────────────────
//

/// The shared content of a question group, one variant per part shape.
///
/// Backend payloads mix shapes across part types; they are normalized
/// into this closed set at load time so downstream code never branches
/// on the raw backend shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupContent {
    /// Listening groups: an audio clip, optionally with a photograph.
    Media {
        audio: Option<MediaUri>,
        image: Option<MediaUri>,
    },
    /// Reading-comprehension groups sharing a passage.
    Passage { text: String },
    /// Text-completion groups sharing a cloze paragraph.
    Cloze { text: String },
}

/// A cluster of questions sharing common media or a passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGroup {
    content: GroupContent,
    questions: Vec<Question>,
}

impl QuestionGroup {
    /// Build a group. Questions are sorted by `question_number`
    /// ascending regardless of the order they arrived from the backend.
    #[must_use]
    pub fn new(content: GroupContent, mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(Question::question_number);
        Self { content, questions }
    }

    #[must_use]
    pub fn content(&self) -> &GroupContent {
        &self.content
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(Question::id).collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
