use thiserror::Error;

use crate::model::{MediaError, PartError, QuestionError, SessionConfigError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Part(#[from] PartError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    SessionConfig(#[from] SessionConfigError),
}
