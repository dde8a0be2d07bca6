//! Integration test: derived addresses line up across crates.
//!
//! The instruction builders, the in-memory program and the raw derivation
//! functions must agree on every account a credential touches.

use passport_client::{instruction, MintCredentialRequest, PassportProgram, Transaction};
use passport_core::CredentialType;
use passport_crypto::{
    associated_token_address, create_program_address, credential_mint_address, hash,
    issuer_registry_address, mint_address, Keypair,
};
use passport_integration_tests::{funded_program, program_id};

#[test]
fn test_registry_address_is_stable_and_off_curve() {
    let (first, bump) = issuer_registry_address(&program_id()).unwrap();
    let (second, bump_again) = issuer_registry_address(&program_id()).unwrap();
    assert_eq!(first, second);
    assert_eq!(bump, bump_again);
    assert!(!first.is_on_curve());

    let rebuilt = create_program_address(&[b"issuer-registry", &[bump]], &program_id()).unwrap();
    assert_eq!(rebuilt, first);
}

#[test]
fn test_credential_addresses_depend_on_direction() {
    let a = Keypair::from_seed(&[1u8; 32]).pubkey();
    let b = Keypair::from_seed(&[2u8; 32]).pubkey();

    let (a_to_b, _) = credential_mint_address(&a, &b, &program_id()).unwrap();
    let (b_to_a, _) = credential_mint_address(&b, &a, &program_id()).unwrap();
    assert_ne!(a_to_b, b_to_a);

    let (mint, _) = mint_address(&a_to_b, &program_id()).unwrap();
    assert_ne!(mint, a_to_b);
    assert!(!mint.is_on_curve());
}

#[test]
fn test_mint_instruction_uses_derived_accounts() {
    let issuer = Keypair::from_seed(&[7u8; 32]);
    let student = Keypair::from_seed(&[8u8; 32]).pubkey();

    let ix = instruction::mint_credential(
        &program_id(),
        &issuer.pubkey(),
        &student,
        CredentialType::Course,
        &"N".repeat(32),
        &"S".repeat(10),
        &"u".repeat(64),
    )
    .unwrap();

    let (registry, _) = issuer_registry_address(&program_id()).unwrap();
    let (credential, _) =
        credential_mint_address(&issuer.pubkey(), &student, &program_id()).unwrap();
    let (mint, _) = mint_address(&credential, &program_id()).unwrap();
    let token_account = associated_token_address(&student, &mint).unwrap();

    let keys: Vec<_> = ix.accounts.iter().map(|m| m.pubkey).collect();
    assert_eq!(&keys[..6], &[credential, registry, mint, token_account, student, issuer.pubkey()]);

    // Longest accepted fields still fit in one packet.
    let tx = Transaction::new_signed(&[ix], &[&issuer], hash(b"recent blockhash")).unwrap();
    let wire = tx.serialize().unwrap();
    assert!(wire.len() <= passport_client::transaction::PACKET_DATA_SIZE);
    assert!(tx.signature().verify(&tx.message.serialize().unwrap(), &issuer.pubkey()).is_ok());
}

#[tokio::test]
async fn test_in_memory_program_agrees_with_derivation() {
    let program = funded_program();
    let me = program.payer().unwrap();
    program.initialize_registry().await.unwrap();
    program.add_issuer(&me).await.unwrap();

    let student = Keypair::generate().pubkey();
    let minted = program
        .mint_credential(&MintCredentialRequest {
            student,
            credential_type: CredentialType::SkillBadge,
            name: "Rust Ownership".into(),
            symbol: "RUST".into(),
            uri: "ipfs://placeholder/42".into(),
        })
        .await
        .unwrap();

    let (credential, bump) = credential_mint_address(&me, &student, &program_id()).unwrap();
    assert_eq!(minted.credential_mint, credential);
    assert_eq!(minted.mint, mint_address(&credential, &program_id()).unwrap().0);
    assert_eq!(
        minted.token_account,
        associated_token_address(&student, &minted.mint).unwrap()
    );

    let record = program.fetch_credential(&credential).await.unwrap().unwrap();
    assert_eq!(record.bump, bump);
    assert_eq!(record.credential_type, CredentialType::SkillBadge);
}
