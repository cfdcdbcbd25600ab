//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{
    MediaError, PartKey, QuestionError, QuestionId, SessionConfigError,
};
use storage::repository::StorageError;

/// Errors emitted by `BackendClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("backend base URL is not configured")]
    NotConfigured,
    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Errors emitted by part providers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("question {0} does not belong to this part")]
    UnknownQuestion(QuestionId),
    #[error("part data is not loaded")]
    NotLoaded,
}

/// Errors emitted by the test session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("part {0} is not part of this session")]
    UnknownPart(PartKey),
    #[error("no part owns question {0}")]
    UnknownQuestion(QuestionId),
    #[error("session has been torn down")]
    Inactive,
    #[error(transparent)]
    Config(#[from] SessionConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors emitted by the submission aggregator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("no authenticated user; log in again before submitting")]
    NotAuthenticated,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
