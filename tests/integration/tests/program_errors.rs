//! Integration test: cluster errors reach callers as typed variants.

use passport_client::rpc::decode_transaction_error;
use passport_client::{ClientError, ProgramError};
use serde_json::json;

#[test]
fn test_custom_codes_map_to_program_errors() {
    let cases = [
        (6000, ProgramError::IssuerAlreadyExists),
        (6001, ProgramError::UnauthorizedIssuer),
        (6002, ProgramError::CredentialRevoked),
        (6003, ProgramError::InvalidCredentialType),
        (6004, ProgramError::IssuerRegistryFull),
        (6005, ProgramError::NameTooLong),
        (6006, ProgramError::SymbolTooLong),
        (6007, ProgramError::UriTooLong),
    ];
    for (code, expected) in cases {
        let err = json!({ "InstructionError": [0, { "Custom": code }] });
        match decode_transaction_error(&err) {
            Some(ClientError::Program(actual)) => assert_eq!(actual, expected),
            other => panic!("code {} decoded as {:?}", code, other),
        }
    }
}

#[test]
fn test_unauthorized_issuer_message_is_actionable() {
    let err = ClientError::from(ProgramError::from_code(6001));
    assert!(err.to_string().contains("verified issuer"));
}

#[test]
fn test_unfunded_fee_payer() {
    for name in ["AccountNotFound", "InsufficientFundsForFee"] {
        assert!(matches!(
            decode_transaction_error(&json!(name)),
            Some(ClientError::InsufficientFunds)
        ));
    }
    assert!(decode_transaction_error(&json!("BlockhashNotFound")).is_none());
}
