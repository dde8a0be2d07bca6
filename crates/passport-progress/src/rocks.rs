//! RocksDB progress repository.
//!
//! Each course is stored under its own key in the `progress` column family,
//! so writers touching different courses never overwrite each other. Two
//! writers on the same course are last-write-wins.

use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, DB};

use passport_core::{CourseProgress, UserProgress};

use crate::error::ProgressError;
use crate::repository::ProgressRepository;

const CF_PROGRESS: &str = "progress";

/// RocksDB-backed progress storage.
pub struct RocksProgressRepository {
    db: DB,
}

impl RocksProgressRepository {
    /// Open or create the store at `path`.
    pub fn open(path: &Path) -> Result<Self, ProgressError> {
        std::fs::create_dir_all(path)
            .map_err(|e| ProgressError::Storage(format!("{}: {}", path.display(), e)))?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_PROGRESS,
            Options::default(),
        )];
        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        tracing::debug!(path = %path.display(), "opened progress store");
        Ok(Self { db })
    }

    fn cf(&self) -> Result<&ColumnFamily, ProgressError> {
        self.db.cf_handle(CF_PROGRESS).ok_or_else(|| {
            ProgressError::Storage(format!("column family '{}' not found", CF_PROGRESS))
        })
    }
}

impl ProgressRepository for RocksProgressRepository {
    fn load(&self, course_id: &str) -> Result<Option<CourseProgress>, ProgressError> {
        match self.db.get_cf(self.cf()?, course_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, progress: &CourseProgress) -> Result<(), ProgressError> {
        let value = serde_json::to_vec(progress)?;
        self.db
            .put_cf(self.cf()?, progress.course_id.as_bytes(), value)?;
        Ok(())
    }

    fn load_all(&self) -> Result<UserProgress, ProgressError> {
        let mut all = UserProgress::new();
        for item in self.db.iterator_cf(self.cf()?, IteratorMode::Start) {
            let (key, value) = item?;
            let progress: CourseProgress = serde_json::from_slice(&value)?;
            if progress.course_id.as_bytes() != key.as_ref() {
                tracing::warn!(
                    key = %String::from_utf8_lossy(&key),
                    course_id = %progress.course_id,
                    "progress record stored under a mismatched key"
                );
            }
            all.insert(progress.course_id.clone(), progress);
        }
        Ok(all)
    }
}
