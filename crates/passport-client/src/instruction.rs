//! Anchor instruction encoding for the credential program.
//!
//! Instruction data is the 8-byte `global:<name>` discriminator followed by
//! the Borsh encoding of the arguments. Account order matches the program's
//! `#[derive(Accounts)]` structs.

use bytes::{BufMut, BytesMut};

use passport_core::CredentialType;
use passport_crypto::{
    associated_token_address, credential_mint_address, instruction_discriminator,
    issuer_registry_address, mint_address, Pubkey, ASSOCIATED_TOKEN_PROGRAM_ID,
    SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

use crate::error::ClientError;

/// An account referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

fn instruction_data(name: &str) -> BytesMut {
    let mut data = BytesMut::with_capacity(64);
    data.put_slice(&instruction_discriminator(name));
    data
}

/// Borsh string: `u32` little-endian byte length, then UTF-8 bytes.
pub(crate) fn put_borsh_string(buf: &mut BytesMut, value: &str) {
    buf.put_u32_le(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

/// `initialize_issuer_registry()`; `authority` pays and becomes the
/// registry authority.
pub fn initialize_issuer_registry(
    program_id: &Pubkey,
    authority: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (registry, _) = issuer_registry_address(program_id)?;
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(registry, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: instruction_data("initialize_issuer_registry").to_vec(),
    })
}

fn registry_update(
    name: &str,
    program_id: &Pubkey,
    authority: &Pubkey,
    issuer: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (registry, _) = issuer_registry_address(program_id)?;
    let mut data = instruction_data(name);
    data.put_slice(issuer.as_ref());
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(registry, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: data.to_vec(),
    })
}

/// `add_verified_issuer(issuer)`, signed by the registry authority.
pub fn add_verified_issuer(
    program_id: &Pubkey,
    authority: &Pubkey,
    issuer: &Pubkey,
) -> Result<Instruction, ClientError> {
    registry_update("add_verified_issuer", program_id, authority, issuer)
}

/// `remove_verified_issuer(issuer)`, signed by the registry authority.
pub fn remove_verified_issuer(
    program_id: &Pubkey,
    authority: &Pubkey,
    issuer: &Pubkey,
) -> Result<Instruction, ClientError> {
    registry_update("remove_verified_issuer", program_id, authority, issuer)
}

/// `mint_credential(credential_type, name, symbol, uri)`; `issuer` signs
/// and pays for the credential record, mint and token account.
pub fn mint_credential(
    program_id: &Pubkey,
    issuer: &Pubkey,
    student: &Pubkey,
    credential_type: CredentialType,
    name: &str,
    symbol: &str,
    uri: &str,
) -> Result<Instruction, ClientError> {
    let (registry, _) = issuer_registry_address(program_id)?;
    let (credential, _) = credential_mint_address(issuer, student, program_id)?;
    let (mint, _) = mint_address(&credential, program_id)?;
    let token_account = associated_token_address(student, &mint)?;

    let mut data = instruction_data("mint_credential");
    data.put_u8(credential_type.as_u8());
    put_borsh_string(&mut data, name);
    put_borsh_string(&mut data, symbol);
    put_borsh_string(&mut data, uri);

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(credential, false),
            AccountMeta::new_readonly(registry, false),
            AccountMeta::new(mint, false),
            AccountMeta::new(token_account, false),
            AccountMeta::new_readonly(*student, false),
            AccountMeta::new(*issuer, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        ],
        data: data.to_vec(),
    })
}

/// `revoke_credential()` for the credential `issuer` minted to `student`.
pub fn revoke_credential(
    program_id: &Pubkey,
    issuer: &Pubkey,
    student: &Pubkey,
) -> Result<Instruction, ClientError> {
    let (credential, _) = credential_mint_address(issuer, student, program_id)?;
    let (mint, _) = mint_address(&credential, program_id)?;
    let token_account = associated_token_address(student, &mint)?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(credential, false),
            AccountMeta::new(mint, false),
            AccountMeta::new(token_account, false),
            AccountMeta::new_readonly(*issuer, true),
            AccountMeta::new_readonly(*student, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: instruction_data("revoke_credential").to_vec(),
    })
}
