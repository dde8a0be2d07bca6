use crate::progress_state::{ProgressEvent, ProgressState};

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid progress transition: {event} from {from}")]
    InvalidStateTransition {
        from: ProgressState,
        event: ProgressEvent,
    },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("unknown course: {0}")]
    UnknownCourse(String),

    #[error("unknown lesson {lesson_id} in course {course_id}")]
    UnknownLesson { course_id: String, lesson_id: String },

    #[error("invalid credential type: {0}")]
    InvalidCredentialType(u8),

    #[error("config error: {0}")]
    Config(String),

    #[error("catalog parse error: {0}")]
    CatalogParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
