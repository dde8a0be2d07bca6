use passport_core::CoreError;

/// Progress tracker errors.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("not enrolled in course: {0}")]
    NotEnrolled(String),

    #[error("course {course_id} has {remaining} lesson(s) without a passing result")]
    LessonsIncomplete { course_id: String, remaining: usize },

    #[error("invalid quiz score {0}: must be between 0 and 100")]
    InvalidScore(u8),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<rocksdb::Error> for ProgressError {
    fn from(e: rocksdb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
