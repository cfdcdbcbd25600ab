#![forbid(unsafe_code)]

pub mod aggregator;
pub mod backend;
pub mod error;
pub mod index;
pub mod provider;
pub mod registry;
pub mod session;
pub mod ticker;

pub use exam_core::Clock;

pub use aggregator::{AggregatedResult, SessionOutcome, SubmissionAggregator, aggregate};
pub use backend::{BackendClient, BackendConfig, PracticeSubmission, ScoredResult, UserAnswer};
pub use error::{BackendError, ProviderError, SessionError, SubmissionError};
pub use index::{IndexEntry, question_index};
pub use provider::{AnswerEffect, PartData, PartProvider, PartSlot};
pub use registry::PartRegistry;
pub use session::TestSession;
pub use ticker::SessionTicker;
