use std::fmt;

use passport_core::CoreError;
use passport_crypto::CryptoError;
use passport_progress::ProgressError;

/// First custom error code assigned by the program.
pub const PROGRAM_ERROR_OFFSET: u32 = 6000;

/// Custom errors raised by the credential program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    IssuerAlreadyExists,
    UnauthorizedIssuer,
    CredentialRevoked,
    InvalidCredentialType,
    IssuerRegistryFull,
    NameTooLong,
    SymbolTooLong,
    UriTooLong,
    /// A code outside the program's own range, such as a framework
    /// constraint failure.
    Other(u32),
}

impl ProgramError {
    pub fn from_code(code: u32) -> Self {
        match code {
            6000 => Self::IssuerAlreadyExists,
            6001 => Self::UnauthorizedIssuer,
            6002 => Self::CredentialRevoked,
            6003 => Self::InvalidCredentialType,
            6004 => Self::IssuerRegistryFull,
            6005 => Self::NameTooLong,
            6006 => Self::SymbolTooLong,
            6007 => Self::UriTooLong,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::IssuerAlreadyExists => 6000,
            Self::UnauthorizedIssuer => 6001,
            Self::CredentialRevoked => 6002,
            Self::InvalidCredentialType => 6003,
            Self::IssuerRegistryFull => 6004,
            Self::NameTooLong => 6005,
            Self::SymbolTooLong => 6006,
            Self::UriTooLong => 6007,
            Self::Other(code) => *code,
        }
    }

    /// Variant name as the program declares it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IssuerAlreadyExists => "IssuerAlreadyExists",
            Self::UnauthorizedIssuer => "UnauthorizedIssuer",
            Self::CredentialRevoked => "CredentialRevoked",
            Self::InvalidCredentialType => "InvalidCredentialType",
            Self::IssuerRegistryFull => "IssuerRegistryFull",
            Self::NameTooLong => "NameTooLong",
            Self::SymbolTooLong => "SymbolTooLong",
            Self::UriTooLong => "UriTooLong",
            Self::Other(_) => "Other",
        }
    }
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IssuerAlreadyExists => write!(f, "issuer already exists in the registry"),
            Self::UnauthorizedIssuer => write!(
                f,
                "you are not a verified issuer; \
                 the registry authority must add your wallet to the issuer registry"
            ),
            Self::CredentialRevoked => write!(f, "credential has been revoked"),
            Self::InvalidCredentialType => write!(f, "invalid credential type"),
            Self::IssuerRegistryFull => write!(f, "issuer registry is full (max 10 issuers)"),
            Self::NameTooLong => write!(f, "name too long (max 32 characters)"),
            Self::SymbolTooLong => write!(f, "symbol too long (max 10 characters)"),
            Self::UriTooLong => write!(f, "URI too long (max 64 characters)"),
            Self::Other(code) => write!(f, "program error {} (0x{:x})", code, code),
        }
    }
}

/// Errors from talking to the cluster and the credential program.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("insufficient SOL balance to pay for the transaction; request an airdrop first")]
    InsufficientFunds,

    #[error("program error: {0}")]
    Program(ProgramError),

    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("transaction {0} was not confirmed in time")]
    ConfirmationTimeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("progress error: {0}")]
    Progress(#[from] ProgressError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<ProgramError> for ClientError {
    fn from(e: ProgramError) -> Self {
        Self::Program(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(ProgramError::from_code(6001), ProgramError::UnauthorizedIssuer);
        for code in 6000..=6007 {
            let err = ProgramError::from_code(code);
            assert_ne!(err, ProgramError::Other(code));
            assert_eq!(err.code(), code);
        }
        assert_eq!(ProgramError::from_code(3012), ProgramError::Other(3012));
    }

    #[test]
    fn test_friendly_messages() {
        let err = ClientError::Program(ProgramError::UnauthorizedIssuer);
        assert!(err.to_string().contains("not a verified issuer"));
        assert!(ClientError::InsufficientFunds.to_string().contains("airdrop"));
    }
}
