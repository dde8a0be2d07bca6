//! Claiming the credential for a completed course.

use chrono::Utc;

use passport_core::{Course, CourseProgress, ProgressState};
use passport_progress::{ProgressRepository, ProgressTracker};

use crate::error::ClientError;
use crate::program::{MintCredentialRequest, MintCredentialResponse, PassportProgram};

#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub response: MintCredentialResponse,
    /// The course record after the mint was recorded.
    pub progress: CourseProgress,
}

/// Mint the credential for `course` to the program's wallet and record
/// the transaction signature in local progress.
///
/// The wallet both issues and receives the credential, so it must be a
/// verified issuer. Nothing is sent unless the course is completed and
/// not yet claimed.
pub async fn claim_course_credential<P, R>(
    program: &P,
    tracker: &ProgressTracker<R>,
    course: &Course,
) -> Result<ClaimOutcome, ClientError>
where
    P: PassportProgram + ?Sized,
    R: ProgressRepository,
{
    match tracker.state(&course.id)? {
        ProgressState::Completed => {}
        ProgressState::CredentialClaimed => {
            return Err(ClientError::InvalidRequest(
                "You've already claimed this credential".into(),
            ));
        }
        ProgressState::Unenrolled => {
            return Err(ClientError::InvalidRequest(format!(
                "You are not enrolled in {}",
                course.id
            )));
        }
        ProgressState::Enrolled | ProgressState::LessonsInProgress => {
            return Err(ClientError::InvalidRequest(
                "You must complete all lessons first".into(),
            ));
        }
    }

    let learner = program
        .payer()
        .ok_or_else(|| ClientError::InvalidRequest("connect a wallet to claim".into()))?;
    let request = MintCredentialRequest::for_course(course, learner, Utc::now());
    let response = program.mint_credential(&request).await?;

    // Minted on-chain; local bookkeeping failures must not hide the signature.
    let progress = tracker
        .mark_credential_minted(&course.id, &response.signature.to_string())
        .inspect_err(|e| {
            tracing::error!(
                course_id = %course.id,
                signature = %response.signature,
                error = %e,
                "credential minted but progress not updated"
            )
        })?;

    tracing::info!(
        course_id = %course.id,
        %learner,
        credential_mint = %response.credential_mint,
        "credential claimed"
    );
    Ok(ClaimOutcome { response, progress })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProgramError;
    use crate::program::{InMemoryProgram, LAMPORTS_PER_SOL};
    use passport_core::Catalog;
    use passport_crypto::{Keypair, Pubkey};
    use passport_progress::MemoryProgressRepository;

    fn program() -> InMemoryProgram {
        let program_id: Pubkey = "CTY5CyBk3JkGkqRLsAyqFp4V1RDdSabWTsT5uC1PANzw".parse().unwrap();
        let program = InMemoryProgram::new(program_id, Keypair::generate());
        program.fund(&program.payer().unwrap(), LAMPORTS_PER_SOL);
        program
    }

    async fn self_issuer(program: &InMemoryProgram) {
        program.initialize_registry().await.unwrap();
        program.add_issuer(&program.payer().unwrap()).await.unwrap();
    }

    fn completed_tracker(course: &Course) -> ProgressTracker<MemoryProgressRepository> {
        let tracker = ProgressTracker::new(MemoryProgressRepository::new());
        tracker.enroll(&course.id).unwrap();
        for lesson in &course.lessons {
            tracker.complete_lesson(&course.id, &lesson.id, 100).unwrap();
        }
        tracker.try_complete_course(course).unwrap();
        tracker
    }

    #[tokio::test]
    async fn test_claim_completed_course() {
        let catalog = Catalog::builtin().unwrap();
        let course = catalog.require("blockchain-101").unwrap();
        let program = program();
        self_issuer(&program).await;
        let tracker = completed_tracker(course);

        let outcome = claim_course_credential(&program, &tracker, course).await.unwrap();
        assert!(outcome.progress.credential_minted);
        assert_eq!(
            outcome.progress.credential_tx_signature,
            Some(outcome.response.signature.to_string())
        );
        assert_eq!(
            tracker.state(&course.id).unwrap(),
            ProgressState::CredentialClaimed
        );

        let record = program
            .fetch_credential(&outcome.response.credential_mint)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.student, program.payer().unwrap());
        assert_eq!(record.name, course.title);
        assert!(record.uri.starts_with("ipfs://course/blockchain-101/"));
    }

    #[tokio::test]
    async fn test_claim_every_builtin_course() {
        let catalog = Catalog::builtin().unwrap();
        let authority = program();
        authority.initialize_registry().await.unwrap();

        // One credential per issuer and student, so each course gets its own learner.
        for course in catalog.courses() {
            let learner = authority.connect(Keypair::generate());
            let wallet = learner.payer().unwrap();
            authority.fund(&wallet, LAMPORTS_PER_SOL);
            authority.add_issuer(&wallet).await.unwrap();
            let tracker = completed_tracker(course);

            let outcome = claim_course_credential(&learner, &tracker, course)
                .await
                .unwrap_or_else(|e| panic!("claim {} failed: {}", course.id, e));
            let record = learner
                .fetch_credential(&outcome.response.credential_mint)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(record.name, course.title);
            assert_eq!(record.symbol, course.credential_symbol());
            assert_eq!(
                tracker.state(&course.id).unwrap(),
                ProgressState::CredentialClaimed
            );
        }
    }

    #[tokio::test]
    async fn test_claim_twice() {
        let catalog = Catalog::builtin().unwrap();
        let course = catalog.require("blockchain-101").unwrap();
        let program = program();
        self_issuer(&program).await;
        let tracker = completed_tracker(course);

        claim_course_credential(&program, &tracker, course).await.unwrap();
        let err = claim_course_credential(&program, &tracker, course)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already claimed"));
    }

    #[tokio::test]
    async fn test_claim_incomplete_course() {
        let catalog = Catalog::builtin().unwrap();
        let course = catalog.require("blockchain-101").unwrap();
        let program = program();
        self_issuer(&program).await;

        let tracker = ProgressTracker::new(MemoryProgressRepository::new());
        let err = claim_course_credential(&program, &tracker, course)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));

        tracker.enroll(&course.id).unwrap();
        tracker.complete_lesson(&course.id, "lesson-1", 100).unwrap();
        let err = claim_course_credential(&program, &tracker, course)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("complete all lessons"));
        assert_eq!(program.transaction_count(), 2);
    }

    #[tokio::test]
    async fn test_unverified_learner_keeps_progress() {
        let catalog = Catalog::builtin().unwrap();
        let course = catalog.require("blockchain-101").unwrap();
        let program = program();
        program.initialize_registry().await.unwrap();
        let tracker = completed_tracker(course);

        let err = claim_course_credential(&program, &tracker, course)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Program(ProgramError::UnauthorizedIssuer)
        ));
        assert_eq!(tracker.state(&course.id).unwrap(), ProgressState::Completed);
    }
}
