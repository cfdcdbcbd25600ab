mod ids;
mod part;
mod question;
mod session;
mod status;

pub use ids::{ParseIdError, PracticeId, QuestionId, TestId, UserId};
pub use part::{PartError, PartKey};
pub use question::{
    AnswerOption, GroupContent, MediaError, MediaUri, Question, QuestionError, QuestionGroup,
};
pub use session::{SessionClock, SessionConfig, SessionConfigError, format_mm_ss};
pub use status::QuestionStatus;
