use chrono::Utc;

use passport_core::{
    Course, CourseProgress, LessonProgress, ProgressEvent, ProgressState, ProgressStateMachine,
    QuizResult, UserProgress,
};

use crate::error::ProgressError;
use crate::repository::ProgressRepository;

/// Course progress tracker.
///
/// Every mutation loads the course record, checks the transition against
/// [`ProgressStateMachine`], applies it and saves before returning. Queries
/// on a course without a record report it as not enrolled.
pub struct ProgressTracker<R: ProgressRepository> {
    repo: R,
}

impl<R: ProgressRepository> ProgressTracker<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Load a record and check that `event` is accepted from its state.
    fn load_for(
        &self,
        course_id: &str,
        event: ProgressEvent,
    ) -> Result<CourseProgress, ProgressError> {
        let progress = self
            .repo
            .load(course_id)?
            .ok_or_else(|| ProgressError::NotEnrolled(course_id.to_string()))?;
        ProgressStateMachine::transition(progress.state(), event)?;
        Ok(progress)
    }

    /// Enroll in a course. Enrolling again returns the existing record.
    pub fn enroll(&self, course_id: &str) -> Result<CourseProgress, ProgressError> {
        if let Some(existing) = self.repo.load(course_id)? {
            tracing::debug!(course_id, "already enrolled");
            return Ok(existing);
        }
        ProgressStateMachine::transition(ProgressState::Unenrolled, ProgressEvent::Enroll)?;

        let progress = CourseProgress::new(course_id, Utc::now());
        self.repo.save(&progress)?;
        tracing::info!(course_id, "enrolled in course");
        Ok(progress)
    }

    /// Record a lesson as completed with its quiz score. Repeating it
    /// overwrites the score and completion time.
    pub fn complete_lesson(
        &self,
        course_id: &str,
        lesson_id: &str,
        quiz_score: u8,
    ) -> Result<CourseProgress, ProgressError> {
        if quiz_score > 100 {
            return Err(ProgressError::InvalidScore(quiz_score));
        }
        let mut progress = self.load_for(course_id, ProgressEvent::CompleteLesson)?;

        progress.lessons_progress.insert(
            lesson_id.to_string(),
            LessonProgress::completed(lesson_id, quiz_score, Utc::now()),
        );
        self.repo.save(&progress)?;

        tracing::info!(course_id, lesson_id, quiz_score, "lesson completed");
        Ok(progress)
    }

    /// Mark the course completed. Lesson completion is not checked here;
    /// use [`Self::try_complete_course`] for that.
    pub fn complete_course(&self, course_id: &str) -> Result<CourseProgress, ProgressError> {
        let mut progress = self.load_for(course_id, ProgressEvent::CompleteCourse)?;

        progress.completed = true;
        progress.completed_at = Some(Utc::now());
        self.repo.save(&progress)?;

        tracing::info!(course_id, "course completed");
        Ok(progress)
    }

    /// Record that the course credential was minted in `tx_signature`.
    pub fn mark_credential_minted(
        &self,
        course_id: &str,
        tx_signature: &str,
    ) -> Result<CourseProgress, ProgressError> {
        let mut progress = self.load_for(course_id, ProgressEvent::MarkCredentialMinted)?;

        if progress.credential_minted {
            tracing::warn!(
                course_id,
                previous = ?progress.credential_tx_signature,
                "credential already marked as minted, overwriting signature"
            );
        }
        progress.credential_minted = true;
        progress.credential_tx_signature = Some(tx_signature.to_string());
        self.repo.save(&progress)?;

        tracing::info!(course_id, tx_signature, "credential marked as minted");
        Ok(progress)
    }

    /// Grade a lesson quiz and record the lesson when the score passes.
    pub fn submit_quiz(
        &self,
        course: &Course,
        lesson_id: &str,
        answers: &[usize],
    ) -> Result<QuizResult, ProgressError> {
        self.load_for(&course.id, ProgressEvent::CompleteLesson)?;

        let result = course.grade_quiz(lesson_id, answers)?;
        if result.passed {
            self.complete_lesson(&course.id, lesson_id, result.score)?;
        } else {
            tracing::info!(
                course_id = %course.id,
                lesson_id,
                score = result.score,
                passing_score = course.passing_score,
                "quiz not passed"
            );
        }
        Ok(result)
    }

    /// Complete the course only when every lesson has a passing result.
    pub fn try_complete_course(&self, course: &Course) -> Result<CourseProgress, ProgressError> {
        let progress = self.load_for(&course.id, ProgressEvent::CompleteCourse)?;
        if progress.completed {
            return Ok(progress);
        }

        let remaining = course
            .lessons
            .iter()
            .filter(|lesson| {
                !progress.lessons_progress.get(&lesson.id).is_some_and(|p| {
                    p.completed && p.quiz_score.map_or(true, |s| course.is_passing(s))
                })
            })
            .count();
        if remaining > 0 {
            return Err(ProgressError::LessonsIncomplete {
                course_id: course.id.clone(),
                remaining,
            });
        }

        self.complete_course(&course.id)
    }

    pub fn is_enrolled(&self, course_id: &str) -> Result<bool, ProgressError> {
        Ok(self.repo.load(course_id)?.is_some())
    }

    pub fn is_completed(&self, course_id: &str) -> Result<bool, ProgressError> {
        Ok(self.repo.load(course_id)?.is_some_and(|p| p.completed))
    }

    pub fn is_lesson_completed(
        &self,
        course_id: &str,
        lesson_id: &str,
    ) -> Result<bool, ProgressError> {
        Ok(self
            .repo
            .load(course_id)?
            .is_some_and(|p| p.is_lesson_completed(lesson_id)))
    }

    pub fn course_progress(
        &self,
        course_id: &str,
    ) -> Result<Option<CourseProgress>, ProgressError> {
        self.repo.load(course_id)
    }

    /// Lifecycle state, `Unenrolled` when no record exists.
    pub fn state(&self, course_id: &str) -> Result<ProgressState, ProgressError> {
        Ok(self
            .repo
            .load(course_id)?
            .map_or(ProgressState::Unenrolled, |p| p.state()))
    }

    /// Percentage of `total_lessons` completed, rounded to the nearest
    /// integer. 0 when not enrolled or the course has no lessons.
    pub fn completion_percentage(
        &self,
        course_id: &str,
        total_lessons: usize,
    ) -> Result<u32, ProgressError> {
        Ok(self
            .repo
            .load(course_id)?
            .map_or(0, |p| p.completion_percentage(total_lessons)))
    }

    /// All records, keyed by course id.
    pub fn all_progress(&self) -> Result<UserProgress, ProgressError> {
        self.repo.load_all()
    }

    /// Serialize the whole store in the browser client's
    /// `apec-course-progress` JSON layout.
    pub fn export_json(&self) -> Result<String, ProgressError> {
        Ok(serde_json::to_string_pretty(&self.repo.load_all()?)?)
    }

    /// Import records in the `apec-course-progress` layout. Imported
    /// records replace local ones for the same course. Returns the number
    /// of records written.
    pub fn import_json(&self, json: &str) -> Result<usize, ProgressError> {
        let records: UserProgress = serde_json::from_str(json)?;
        let count = records.len();
        for (key, mut progress) in records {
            if progress.course_id != key {
                tracing::warn!(
                    key = %key,
                    course_id = %progress.course_id,
                    "course id mismatch in import, using key"
                );
                progress.course_id = key;
            }
            self.repo.save(&progress)?;
        }
        tracing::info!(count, "imported progress records");
        Ok(count)
    }
}
