use dashmap::DashMap;

use passport_core::{CourseProgress, UserProgress};

use crate::error::ProgressError;

/// Durable storage for per-course progress records.
///
/// Records are keyed by course id. `save` replaces the stored record for
/// `progress.course_id` and must be durable once it returns.
pub trait ProgressRepository: Send + Sync {
    /// Load the record for one course.
    fn load(&self, course_id: &str) -> Result<Option<CourseProgress>, ProgressError>;

    /// Insert or replace the record for `progress.course_id`.
    fn save(&self, progress: &CourseProgress) -> Result<(), ProgressError>;

    /// Load every stored record.
    fn load_all(&self) -> Result<UserProgress, ProgressError>;
}

/// Process-local repository backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryProgressRepository {
    records: DashMap<String, CourseProgress>,
}

impl MemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored course records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressRepository for MemoryProgressRepository {
    fn load(&self, course_id: &str) -> Result<Option<CourseProgress>, ProgressError> {
        Ok(self.records.get(course_id).map(|e| e.value().clone()))
    }

    fn save(&self, progress: &CourseProgress) -> Result<(), ProgressError> {
        self.records
            .insert(progress.course_id.clone(), progress.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<UserProgress, ProgressError> {
        Ok(self
            .records
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_save_and_load() {
        let repo = MemoryProgressRepository::new();
        assert!(repo.load("blockchain-101").unwrap().is_none());

        let progress = CourseProgress::new("blockchain-101", Utc::now());
        repo.save(&progress).unwrap();
        assert_eq!(repo.load("blockchain-101").unwrap(), Some(progress));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_save_replaces() {
        let repo = MemoryProgressRepository::new();
        let mut progress = CourseProgress::new("c", Utc::now());
        repo.save(&progress).unwrap();
        progress.completed = true;
        repo.save(&progress).unwrap();

        assert_eq!(repo.len(), 1);
        assert!(repo.load("c").unwrap().unwrap().completed);
    }

    #[test]
    fn test_load_all_keyed_by_course() {
        let repo = MemoryProgressRepository::new();
        repo.save(&CourseProgress::new("a", Utc::now())).unwrap();
        repo.save(&CourseProgress::new("b", Utc::now())).unwrap();

        let all = repo.load_all().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
