use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartError {
    #[error("unknown part: {0}")]
    Unknown(String),
}

/// One of the seven fixed sections of the exam.
///
/// Parts 1-4 are listening, parts 5-7 reading. Ordering follows the
/// exam-visible part number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartKey {
    Photographs,
    QuestionResponse,
    Conversations,
    ShortTalks,
    IncompleteSentences,
    TextCompletion,
    ReadingComprehension,
}

impl PartKey {
    pub const ALL: [PartKey; 7] = [
        PartKey::Photographs,
        PartKey::QuestionResponse,
        PartKey::Conversations,
        PartKey::ShortTalks,
        PartKey::IncompleteSentences,
        PartKey::TextCompletion,
        PartKey::ReadingComprehension,
    ];

    /// Exam-visible part number, 1 through 7.
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            PartKey::Photographs => 1,
            PartKey::QuestionResponse => 2,
            PartKey::Conversations => 3,
            PartKey::ShortTalks => 4,
            PartKey::IncompleteSentences => 5,
            PartKey::TextCompletion => 6,
            PartKey::ReadingComprehension => 7,
        }
    }

    /// The backend's key for this part ("part1".."part7").
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            PartKey::Photographs => "part1",
            PartKey::QuestionResponse => "part2",
            PartKey::Conversations => "part3",
            PartKey::ShortTalks => "part4",
            PartKey::IncompleteSentences => "part5",
            PartKey::TextCompletion => "part6",
            PartKey::ReadingComprehension => "part7",
        }
    }

    /// The user-facing part name ("Part 1".."Part 7").
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("Part {}", self.number())
    }

    /// True for the listening-comprehension parts (1-4).
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.number() <= 4
    }

    #[must_use]
    fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.number() == number)
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PartKey {
    type Err = PartError;

    /// Accepts both the backend key form ("part3") and the display
    /// form ("Part 3").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("part")
            .or_else(|| trimmed.strip_prefix("Part"))
            .map(str::trim);
        digits
            .and_then(|d| d.parse::<u8>().ok())
            .and_then(Self::from_number)
            .ok_or_else(|| PartError::Unknown(s.to_string()))
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
