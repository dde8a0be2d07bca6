//! Program derived addresses.
//!
//! An address is `SHA-256(seeds ‖ bump ‖ program_id ‖ "ProgramDerivedAddress")`
//! for the highest bump (255 down to 1) whose digest is not an Ed25519 point.
//! The on-chain program recomputes the same digest, so this must match the
//! runtime bit-for-bit.

use crate::error::CryptoError;
use crate::hashing::hashv;
use crate::pubkey::{
    bytes_are_curve_point, Pubkey, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;
/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

pub const ISSUER_REGISTRY_SEED: &[u8] = b"issuer-registry";
pub const CREDENTIAL_SEED: &[u8] = b"credential";
pub const MINT_SEED: &[u8] = b"mint";

/// Derive the address for `seeds` exactly as given (bump already appended).
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, CryptoError> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(CryptoError::MaxSeedLengthExceeded);
    }

    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    parts.extend_from_slice(seeds);
    parts.push(program_id.as_ref());
    parts.push(PDA_MARKER);
    let digest = hashv(&parts);

    if bytes_are_curve_point(&digest) {
        return Err(CryptoError::InvalidSeeds);
    }
    Ok(Pubkey::new_from_array(digest))
}

/// Find the canonical address and bump for `seeds`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), CryptoError> {
    if seeds.len() >= MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(CryptoError::MaxSeedLengthExceeded);
    }

    for bump in (1..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => {
                tracing::trace!(%address, bump, program = %program_id, "derived program address");
                return Ok((address, bump));
            }
            Err(CryptoError::InvalidSeeds) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(CryptoError::NoViableBump)
}

/// The singleton issuer registry: seeds `["issuer-registry"]`.
pub fn issuer_registry_address(program_id: &Pubkey) -> Result<(Pubkey, u8), CryptoError> {
    find_program_address(&[ISSUER_REGISTRY_SEED], program_id)
}

/// Credential record for an (issuer, student) pair:
/// seeds `["credential", issuer, student]`.
pub fn credential_mint_address(
    issuer: &Pubkey,
    student: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), CryptoError> {
    find_program_address(
        &[CREDENTIAL_SEED, issuer.as_ref(), student.as_ref()],
        program_id,
    )
}

/// Token mint backing a credential record: seeds `["mint", credential_mint]`.
pub fn mint_address(
    credential_mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), CryptoError> {
    find_program_address(&[MINT_SEED, credential_mint.as_ref()], program_id)
}

/// The wallet's associated token account for `mint`.
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, CryptoError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _)| address)
}
