use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::progress_state::ProgressState;

/// Kinds of credential the on-chain program can mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialType {
    /// Completion of a single course.
    Course,
    /// Full degree.
    Degree,
    /// Skill badge.
    SkillBadge,
}

impl CredentialType {
    /// The `u8` the program stores for this type.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Course => 0,
            Self::Degree => 1,
            Self::SkillBadge => 2,
        }
    }

    /// Decode the program's `u8` representation.
    pub fn from_u8(value: u8) -> Result<Self, CoreError> {
        match value {
            0 => Ok(Self::Course),
            1 => Ok(Self::Degree),
            2 => Ok(Self::SkillBadge),
            other => Err(CoreError::InvalidCredentialType(other)),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Course => "Course Completion",
            Self::Degree => "Degree",
            Self::SkillBadge => "Skill Badge",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Progress on a single lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: String,
    pub completed: bool,
    /// Quiz score in percent (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<u8>,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

impl LessonProgress {
    /// A lesson completed now with the given quiz score.
    pub fn completed(lesson_id: impl Into<String>, quiz_score: u8, at: DateTime<Utc>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            completed: true,
            quiz_score: Some(quiz_score),
            completed_at: Some(at),
        }
    }
}

/// Local progress record for one course.
///
/// Field names serialize in camelCase so records written by the browser
/// client under `apec-course-progress` stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub enrolled_at: DateTime<Utc>,
    #[serde(default)]
    pub lessons_progress: BTreeMap<String, LessonProgress>,
    pub completed: bool,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    pub credential_minted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_tx_signature: Option<String>,
}

impl CourseProgress {
    /// Fresh enrollment with no lessons completed.
    pub fn new(course_id: impl Into<String>, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            course_id: course_id.into(),
            enrolled_at,
            lessons_progress: BTreeMap::new(),
            completed: false,
            completed_at: None,
            credential_minted: false,
            credential_tx_signature: None,
        }
    }

    /// Number of distinct lessons marked completed.
    pub fn completed_lesson_count(&self) -> usize {
        self.lessons_progress
            .values()
            .filter(|lesson| lesson.completed)
            .count()
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.lessons_progress
            .get(lesson_id)
            .is_some_and(|lesson| lesson.completed)
    }

    /// `round(100 * completed / total)`; 0 when the course has no lessons.
    pub fn completion_percentage(&self, total_lessons: usize) -> u32 {
        if total_lessons == 0 {
            return 0;
        }
        // Integer round-half-up of 100 * completed / total.
        let completed = self.completed_lesson_count();
        ((completed * 200 + total_lessons) / (total_lessons * 2)) as u32
    }

    /// The lifecycle state this record is in.
    pub fn state(&self) -> ProgressState {
        if self.credential_minted {
            ProgressState::CredentialClaimed
        } else if self.completed {
            ProgressState::Completed
        } else if self.completed_lesson_count() > 0 {
            ProgressState::LessonsInProgress
        } else {
            ProgressState::Enrolled
        }
    }
}

/// All local progress, keyed by course id.
pub type UserProgress = BTreeMap<String, CourseProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_credential_type_u8_roundtrip() {
        for ty in [
            CredentialType::Course,
            CredentialType::Degree,
            CredentialType::SkillBadge,
        ] {
            assert_eq!(CredentialType::from_u8(ty.as_u8()).unwrap(), ty);
        }
        assert!(matches!(
            CredentialType::from_u8(3),
            Err(CoreError::InvalidCredentialType(3))
        ));
    }

    #[test]
    fn test_credential_type_labels() {
        assert_eq!(CredentialType::Course.to_string(), "Course Completion");
        assert_eq!(CredentialType::SkillBadge.label(), "Skill Badge");
    }

    #[test]
    fn test_new_progress_is_enrolled() {
        let progress = CourseProgress::new("blockchain-101", ts(1_700_000_000_000));
        assert_eq!(progress.state(), ProgressState::Enrolled);
        assert!(!progress.completed);
        assert!(!progress.credential_minted);
        assert_eq!(progress.completed_lesson_count(), 0);
    }

    #[test]
    fn test_completion_percentage_rounds() {
        let mut progress = CourseProgress::new("c", ts(0));
        progress
            .lessons_progress
            .insert("l1".into(), LessonProgress::completed("l1", 90, ts(1)));
        assert_eq!(progress.completion_percentage(3), 33);
        progress
            .lessons_progress
            .insert("l2".into(), LessonProgress::completed("l2", 90, ts(2)));
        assert_eq!(progress.completion_percentage(3), 67);
        assert_eq!(progress.completion_percentage(0), 0);
    }

    #[test]
    fn test_incomplete_lessons_not_counted() {
        let mut progress = CourseProgress::new("c", ts(0));
        progress.lessons_progress.insert(
            "l1".into(),
            LessonProgress {
                lesson_id: "l1".into(),
                completed: false,
                quiz_score: None,
                completed_at: None,
            },
        );
        assert_eq!(progress.completed_lesson_count(), 0);
        assert!(!progress.is_lesson_completed("l1"));
        assert_eq!(progress.state(), ProgressState::Enrolled);
    }

    #[test]
    fn test_state_precedence() {
        let mut progress = CourseProgress::new("c", ts(0));
        progress.credential_minted = true;
        assert_eq!(progress.state(), ProgressState::CredentialClaimed);
        progress.credential_minted = false;
        progress.completed = true;
        assert_eq!(progress.state(), ProgressState::Completed);
    }

    #[test]
    fn test_reads_browser_record() {
        let json = r#"{
            "courseId": "blockchain-101",
            "enrolledAt": 1700000000000,
            "lessonsProgress": {
                "lesson-1": {"lessonId": "lesson-1", "completed": true, "quizScore": 80, "completedAt": 1700000100000}
            },
            "completed": false,
            "credentialMinted": false
        }"#;
        let progress: CourseProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.course_id, "blockchain-101");
        assert_eq!(progress.enrolled_at, ts(1_700_000_000_000));
        assert_eq!(progress.lessons_progress["lesson-1"].quiz_score, Some(80));
        assert!(progress.completed_at.is_none());
        assert!(progress.credential_tx_signature.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut progress = CourseProgress::new("c", ts(5));
        progress.credential_tx_signature = Some("sig".into());
        let value = serde_json::to_value(&progress).unwrap();
        assert_eq!(value["courseId"], "c");
        assert_eq!(value["enrolledAt"], 5);
        assert_eq!(value["credentialTxSignature"], "sig");
        assert!(value.get("completedAt").is_none());
    }
}
