//! Course catalog and quiz grading.
//!
//! The catalog is static course content. A sample catalog ships embedded in
//! the binary; deployments can point at their own TOML file instead.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::CredentialType;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// Characters of the title taken into the credential symbol.
const SYMBOL_CHARS: usize = 10;

/// Byte limits the credential program puts on credential metadata.
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_URI_LEN: usize = 64;

/// Length of `ipfs://course/<id>/<unix-ms>` without the course id.
const COURSE_URI_OVERHEAD: usize = "ipfs://course//".len() + 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseCategory {
    Technology,
    Business,
    Healthcare,
    Engineering,
    Arts,
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration_minutes: u32,
    pub order: u32,
    pub quiz: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: CourseCategory,
    pub country: String,
    pub institution: String,
    pub instructor: String,
    pub duration_minutes: u32,
    pub credential_type: CredentialType,
    /// Percentage needed to pass each lesson quiz.
    pub passing_score: u8,
    pub lessons: Vec<Lesson>,
}

/// Outcome of grading one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    /// `round(100 * correct / total)`.
    pub score: u8,
    pub passed: bool,
}

impl Course {
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    /// Lessons sorted by their `order` field.
    pub fn ordered_lessons(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self.lessons.iter().collect();
        lessons.sort_by_key(|l| l.order);
        lessons
    }

    /// Whether a recorded quiz score meets this course's passing score.
    pub fn is_passing(&self, score: u8) -> bool {
        score >= self.passing_score
    }

    /// Grade `answers` (option indices, one per question) for a lesson.
    pub fn grade_quiz(&self, lesson_id: &str, answers: &[usize]) -> Result<QuizResult, CoreError> {
        let lesson = self.lesson(lesson_id).ok_or_else(|| CoreError::UnknownLesson {
            course_id: self.id.clone(),
            lesson_id: lesson_id.to_string(),
        })?;

        if answers.len() != lesson.quiz.len() {
            return Err(CoreError::ValidationError(format!(
                "expected {} answers for {}, got {}",
                lesson.quiz.len(),
                lesson_id,
                answers.len()
            )));
        }

        let total = lesson.quiz.len();
        let correct = lesson
            .quiz
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.correct_answer == **a)
            .count();
        let score = ((correct as f64 / total as f64) * 100.0).round() as u8;

        Ok(QuizResult {
            correct,
            total,
            score,
            passed: self.is_passing(score),
        })
    }

    /// Token symbol for this course's credential: the first ten characters
    /// of the title, upper-cased, with whitespace removed. Cut at a char
    /// boundary to fit [`MAX_SYMBOL_LEN`] bytes.
    pub fn credential_symbol(&self) -> String {
        let mut symbol = String::new();
        let upper = self
            .title
            .chars()
            .take(SYMBOL_CHARS)
            .flat_map(char::to_uppercase)
            .filter(|c| !c.is_whitespace());
        for c in upper {
            if symbol.len() + c.len_utf8() > MAX_SYMBOL_LEN {
                break;
            }
            symbol.push(c);
        }
        symbol
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.passing_score > 100 {
            return Err(CoreError::ValidationError(format!(
                "course {}: passing score {} exceeds 100",
                self.id, self.passing_score
            )));
        }
        // The title is the credential name at claim time.
        if self.title.trim().is_empty() || self.title.len() > MAX_NAME_LEN {
            return Err(CoreError::ValidationError(format!(
                "course {}: title must be 1 to {} bytes, got {}",
                self.id,
                MAX_NAME_LEN,
                self.title.len()
            )));
        }
        if self.id.len() + COURSE_URI_OVERHEAD > MAX_URI_LEN {
            return Err(CoreError::ValidationError(format!(
                "course {}: id too long for a {}-byte credential uri",
                self.id, MAX_URI_LEN
            )));
        }
        let mut lesson_ids = HashSet::new();
        for lesson in &self.lessons {
            if !lesson_ids.insert(lesson.id.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "course {}: duplicate lesson id {}",
                    self.id, lesson.id
                )));
            }
            if lesson.quiz.is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "course {}: lesson {} has no quiz",
                    self.id, lesson.id
                )));
            }
            for q in &lesson.quiz {
                if q.correct_answer >= q.options.len() {
                    return Err(CoreError::ValidationError(format!(
                        "course {}: question {} answer index out of range",
                        self.id, q.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The set of courses a learner can enroll in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    courses: Vec<Course>,
}

impl Catalog {
    /// The sample catalog embedded in the binary.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let catalog: Catalog = toml::from_str(contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            courses = catalog.courses.len(),
            "loaded course catalog"
        );
        Ok(catalog)
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    /// Like [`Catalog::get`], failing with `UnknownCourse`.
    pub fn require(&self, course_id: &str) -> Result<&Course, CoreError> {
        self.get(course_id)
            .ok_or_else(|| CoreError::UnknownCourse(course_id.to_string()))
    }

    fn validate(&self) -> Result<(), CoreError> {
        let mut ids = HashSet::new();
        for course in &self.courses {
            if !ids.insert(course.id.as_str()) {
                return Err(CoreError::ValidationError(format!(
                    "duplicate course id {}",
                    course.id
                )));
            }
            course.validate()?;
        }
        Ok(())
    }
}
