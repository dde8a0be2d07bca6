//! Passport Client — Typed access to the on-chain credential program.
//!
//! Addresses come from `passport-crypto`; this crate encodes Anchor
//! instructions, builds and signs legacy transactions, talks JSON-RPC to a
//! cluster and decodes the program's accounts and error codes.

pub mod accounts;
pub mod claim;
pub mod error;
pub mod instruction;
pub mod program;
pub mod rpc;
pub mod transaction;

pub use accounts::{CredentialMint, IssuerRegistry};
pub use claim::{claim_course_credential, ClaimOutcome};
pub use error::{ClientError, ProgramError};
pub use instruction::{AccountMeta, Instruction};
pub use program::{
    ConfirmPolicy, InMemoryProgram, MintCredentialRequest, MintCredentialResponse,
    PassportProgram, RevokeCredentialRequest, RpcPassportProgram, LAMPORTS_PER_SOL,
};
pub use rpc::RpcClient;
pub use transaction::{Message, Transaction};
