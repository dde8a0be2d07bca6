//! The credential program as a typed interface.

mod memory;
mod rpc_program;

pub use memory::InMemoryProgram;
pub use rpc_program::RpcPassportProgram;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use passport_core::config::ClusterConfig;
use passport_core::{Course, CredentialType};
use passport_crypto::{Pubkey, Signature};

use crate::accounts::{
    CredentialMint, IssuerRegistry, MAX_NAME_LEN, MAX_SYMBOL_LEN, MAX_URI_LEN,
};
use crate::error::{ClientError, ProgramError};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// How long to wait for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_millis(500),
        }
    }
}

impl From<&ClusterConfig> for ConfirmPolicy {
    fn from(config: &ClusterConfig) -> Self {
        Self {
            attempts: config.confirm_attempts,
            interval: Duration::from_millis(config.confirm_interval_ms),
        }
    }
}

/// Arguments for `mint_credential`. The signing wallet is the issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintCredentialRequest {
    pub student: Pubkey,
    pub credential_type: CredentialType,
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

impl MintCredentialRequest {
    /// Credential for completing `course`: named after the course, with
    /// the course's symbol and a `ipfs://course/<id>/<unix-ms>` URI.
    pub fn for_course(course: &Course, student: Pubkey, at: DateTime<Utc>) -> Self {
        Self {
            student,
            credential_type: course.credential_type,
            name: course.title.clone(),
            symbol: course.credential_symbol(),
            uri: format!("ipfs://course/{}/{}", course.id, at.timestamp_millis()),
        }
    }

    /// Check the program's length limits before anything is sent.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::InvalidRequest("credential name is empty".into()));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(ProgramError::NameTooLong.into());
        }
        if self.symbol.len() > MAX_SYMBOL_LEN {
            return Err(ProgramError::SymbolTooLong.into());
        }
        if self.uri.len() > MAX_URI_LEN {
            return Err(ProgramError::UriTooLong.into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintCredentialResponse {
    pub signature: Signature,
    /// The credential record.
    pub credential_mint: Pubkey,
    /// The token mint backing the credential.
    pub mint: Pubkey,
    /// The student's token account holding the credential token.
    pub token_account: Pubkey,
}

/// Revoke the credential the signing wallet issued to `student`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeCredentialRequest {
    pub student: Pubkey,
}

/// One method per remote operation of the credential program.
///
/// State-changing calls are signed by the implementation's wallet
/// ([`PassportProgram::payer`]) and return once the transaction is
/// confirmed.
#[async_trait]
pub trait PassportProgram: Send + Sync {
    fn program_id(&self) -> Pubkey;

    /// The signing wallet, if one is loaded.
    fn payer(&self) -> Option<Pubkey>;

    /// Create the issuer registry with the payer as authority.
    async fn initialize_registry(&self) -> Result<Signature, ClientError>;

    /// Add a verified issuer. Payer must be the registry authority.
    async fn add_issuer(&self, issuer: &Pubkey) -> Result<Signature, ClientError>;

    /// Remove a verified issuer. Payer must be the registry authority.
    async fn remove_issuer(&self, issuer: &Pubkey) -> Result<Signature, ClientError>;

    /// Mint a credential to `request.student`, issued by the payer.
    async fn mint_credential(
        &self,
        request: &MintCredentialRequest,
    ) -> Result<MintCredentialResponse, ClientError>;

    async fn revoke_credential(
        &self,
        request: &RevokeCredentialRequest,
    ) -> Result<Signature, ClientError>;

    /// The issuer registry, `None` before initialization.
    async fn fetch_registry(&self) -> Result<Option<IssuerRegistry>, ClientError>;

    async fn fetch_credential(
        &self,
        address: &Pubkey,
    ) -> Result<Option<CredentialMint>, ClientError>;

    /// Every credential record whose student is `student`.
    async fn credentials_for_student(
        &self,
        student: &Pubkey,
    ) -> Result<Vec<(Pubkey, CredentialMint)>, ClientError>;

    /// Balance in lamports.
    async fn balance(&self, address: &Pubkey) -> Result<u64, ClientError>;

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, ClientError>;
}
