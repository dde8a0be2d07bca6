//! Passport Progress — Client-local course progress.
//!
//! The [`ProgressTracker`] applies enrollment, lesson completion, course
//! completion and credential marking to per-course records and persists
//! every mutation through a [`ProgressRepository`] before returning.

pub mod error;
pub mod repository;
pub mod rocks;
pub mod tracker;

pub use error::ProgressError;
pub use repository::{MemoryProgressRepository, ProgressRepository};
pub use rocks::RocksProgressRepository;
pub use tracker::ProgressTracker;
