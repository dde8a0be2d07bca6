//! Integration test: a learner's path from enrollment to an on-chain credential.
//!
//! Drives passport-progress over RocksDB together with the passport-client
//! claim flow against the in-memory program.

use passport_client::{
    claim_course_credential, ClientError, InMemoryProgram, MintCredentialRequest, PassportProgram,
    ProgramError,
};
use passport_core::{Catalog, Course, ProgressState};
use passport_integration_tests::{funded_peer, funded_program, temp_store};
use passport_progress::{
    MemoryProgressRepository, ProgressError, ProgressTracker, RocksProgressRepository,
};

fn correct_answers(course: &Course, lesson_id: &str) -> Vec<usize> {
    course
        .lesson(lesson_id)
        .expect("lesson exists")
        .quiz
        .iter()
        .map(|q| q.correct_answer)
        .collect()
}

async fn verified_self_issuer() -> InMemoryProgram {
    let program = funded_program();
    let me = program.payer().unwrap();
    program.initialize_registry().await.unwrap();
    program.add_issuer(&me).await.unwrap();
    program
}

// =========================================================================
// Full journey over a persistent store
// =========================================================================

#[tokio::test]
async fn test_enroll_study_claim_and_reopen() {
    let catalog = Catalog::builtin().unwrap();
    let course = catalog.require("blockchain-101").unwrap();
    let dir = temp_store("journey");
    let program = verified_self_issuer().await;

    let signature = {
        let tracker = ProgressTracker::new(RocksProgressRepository::open(&dir).unwrap());
        tracker.enroll(&course.id).unwrap();
        assert_eq!(tracker.state(&course.id).unwrap(), ProgressState::Enrolled);

        let expected = [33, 67, 100];
        for (lesson, pct) in course.ordered_lessons().into_iter().zip(expected) {
            let result = tracker
                .submit_quiz(course, &lesson.id, &correct_answers(course, &lesson.id))
                .unwrap();
            assert!(result.passed);
            assert_eq!(result.score, 100);
            assert_eq!(
                tracker
                    .completion_percentage(&course.id, course.total_lessons())
                    .unwrap(),
                pct
            );
        }

        tracker.try_complete_course(course).unwrap();
        assert_eq!(tracker.state(&course.id).unwrap(), ProgressState::Completed);

        let outcome = claim_course_credential(&program, &tracker, course)
            .await
            .unwrap();
        outcome.response.signature.to_string()
    };

    // Progress and the recorded signature survive reopening the store.
    let tracker = ProgressTracker::new(RocksProgressRepository::open(&dir).unwrap());
    assert_eq!(
        tracker.state(&course.id).unwrap(),
        ProgressState::CredentialClaimed
    );
    let progress = tracker.course_progress(&course.id).unwrap().unwrap();
    assert!(progress.credential_minted);
    assert_eq!(progress.credential_tx_signature.as_deref(), Some(signature.as_str()));

    let held = program
        .credentials_for_student(&program.payer().unwrap())
        .await
        .unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].1.name, course.title);
    assert!(held[0].1.is_active());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_failed_quiz_blocks_completion_and_claim() {
    let catalog = Catalog::builtin().unwrap();
    let course = catalog.require("blockchain-101").unwrap();
    let program = verified_self_issuer().await;
    let tracker = ProgressTracker::new(MemoryProgressRepository::new());
    tracker.enroll(&course.id).unwrap();

    // All wrong on lesson-3 (two questions, answers 0 and 1).
    let result = tracker.submit_quiz(course, "lesson-3", &[3, 3]).unwrap();
    assert!(!result.passed);
    assert!(!tracker.is_lesson_completed(&course.id, "lesson-3").unwrap());

    assert!(matches!(
        tracker.try_complete_course(course),
        Err(ProgressError::LessonsIncomplete { remaining: 3, .. })
    ));

    let err = claim_course_credential(&program, &tracker, course)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_progress_moves_between_stores() {
    let catalog = Catalog::builtin().unwrap();
    let course = catalog.require("solana-development").unwrap();

    let laptop = ProgressTracker::new(MemoryProgressRepository::new());
    laptop.enroll(&course.id).unwrap();
    let first = course.ordered_lessons()[0].id.clone();
    laptop.complete_lesson(&course.id, &first, 90).unwrap();
    let exported = laptop.export_json().unwrap();

    let dir = temp_store("import");
    let desktop = ProgressTracker::new(RocksProgressRepository::open(&dir).unwrap());
    assert_eq!(desktop.import_json(&exported).unwrap(), 1);
    assert!(desktop.is_lesson_completed(&course.id, &first).unwrap());
    assert_eq!(
        desktop.course_progress(&course.id).unwrap(),
        laptop.course_progress(&course.id).unwrap()
    );

    let _ = std::fs::remove_dir_all(&dir);
}

// =========================================================================
// Institution issuing to students
// =========================================================================

#[tokio::test]
async fn test_institution_issues_then_loses_verification() {
    let authority = funded_program();
    authority.initialize_registry().await.unwrap();
    let institution = funded_peer(&authority);
    let student = funded_peer(&authority);
    let student_key = student.payer().unwrap();

    let request = MintCredentialRequest {
        student: student_key,
        credential_type: passport_core::CredentialType::Degree,
        name: "Bachelor of Computer Science".into(),
        symbol: "BCS".into(),
        uri: "ipfs://placeholder/1700000000000".into(),
    };

    assert!(matches!(
        institution.mint_credential(&request).await,
        Err(ClientError::Program(ProgramError::UnauthorizedIssuer))
    ));

    authority
        .add_issuer(&institution.payer().unwrap())
        .await
        .unwrap();
    let minted = institution.mint_credential(&request).await.unwrap();

    authority
        .remove_issuer(&institution.payer().unwrap())
        .await
        .unwrap();
    let other = MintCredentialRequest {
        student: authority.payer().unwrap(),
        ..request.clone()
    };
    assert!(matches!(
        institution.mint_credential(&other).await,
        Err(ClientError::Program(ProgramError::UnauthorizedIssuer))
    ));

    // Records already issued stay readable and active.
    let held = student.credentials_for_student(&student_key).await.unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].0, minted.credential_mint);
    assert_eq!(held[0].1.issuer, institution.payer().unwrap());
    assert!(held[0].1.is_active());
}
