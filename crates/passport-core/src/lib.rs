//! Passport Core — Fundamental types, errors, course catalog, and
//! configuration for the APEC Learner Passport client.

pub mod catalog;
pub mod config;
pub mod error;
pub mod progress_state;
pub mod types;

pub use catalog::{
    Catalog, Course, CourseCategory, Lesson, QuizQuestion, QuizResult, MAX_NAME_LEN,
    MAX_SYMBOL_LEN, MAX_URI_LEN,
};
pub use config::{Network, PassportConfig};
pub use error::CoreError;
pub use progress_state::{ProgressEvent, ProgressState, ProgressStateMachine};
pub use types::{CourseProgress, CredentialType, LessonProgress, UserProgress};
