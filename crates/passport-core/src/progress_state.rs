use std::fmt;

use crate::error::CoreError;

/// Lifecycle of a learner's progress through one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ProgressState {
    /// No local record exists for the course.
    Unenrolled,
    /// Enrolled, no lesson completed yet.
    Enrolled,
    /// At least one lesson completed.
    LessonsInProgress,
    /// Course marked completed, credential not yet minted.
    Completed,
    /// Credential minted on-chain. Final state.
    CredentialClaimed,
}

impl ProgressState {
    /// Whether this is the final state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::CredentialClaimed)
    }

    /// Whether a credential may be claimed from this state.
    pub fn can_claim(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ProgressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unenrolled => write!(f, "Unenrolled"),
            Self::Enrolled => write!(f, "Enrolled"),
            Self::LessonsInProgress => write!(f, "LessonsInProgress"),
            Self::Completed => write!(f, "Completed"),
            Self::CredentialClaimed => write!(f, "CredentialClaimed"),
        }
    }
}

/// Operations that move a course through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Enroll,
    CompleteLesson,
    CompleteCourse,
    MarkCredentialMinted,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enroll => write!(f, "enroll"),
            Self::CompleteLesson => write!(f, "complete-lesson"),
            Self::CompleteCourse => write!(f, "complete-course"),
            Self::MarkCredentialMinted => write!(f, "mark-credential-minted"),
        }
    }
}

/// Progress transitions.
///
/// - Unenrolled → Enrolled (Enroll); every other event fails
/// - Enroll on an existing record is a no-op
/// - Enrolled | LessonsInProgress → LessonsInProgress (CompleteLesson)
/// - Enrolled | LessonsInProgress | Completed → Completed (CompleteCourse)
/// - any enrolled state → CredentialClaimed (MarkCredentialMinted)
/// - Completed and CredentialClaimed absorb lesson and course completion
///
/// Course completion is not gated on lesson completion here; see
/// `ProgressTracker::try_complete_course` for the catalog-checked variant.
pub struct ProgressStateMachine;

impl ProgressStateMachine {
    /// Compute the state that follows `event`, or fail for an unenrolled course.
    pub fn transition(
        current: ProgressState,
        event: ProgressEvent,
    ) -> Result<ProgressState, CoreError> {
        use ProgressEvent as E;
        use ProgressState as S;

        let next = match (current, event) {
            (S::Unenrolled, E::Enroll) => S::Enrolled,
            (S::Unenrolled, _) => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event,
                });
            }

            (state, E::Enroll) => state,
            (S::CredentialClaimed, _) => S::CredentialClaimed,
            (_, E::MarkCredentialMinted) => S::CredentialClaimed,

            (S::Completed, E::CompleteLesson | E::CompleteCourse) => S::Completed,
            (S::Enrolled | S::LessonsInProgress, E::CompleteLesson) => S::LessonsInProgress,
            (S::Enrolled | S::LessonsInProgress, E::CompleteCourse) => S::Completed,
        };

        tracing::debug!(
            from = %current,
            to = %next,
            event = %event,
            "progress state transition"
        );

        Ok(next)
    }

    /// Check if an event is accepted without applying it.
    pub fn can_transition(current: ProgressState, event: ProgressEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
