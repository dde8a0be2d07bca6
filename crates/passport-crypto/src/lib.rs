pub mod error;
pub mod hashing;
pub mod keypair;
pub mod pda;
pub mod pubkey;
pub mod signature;

pub use error::CryptoError;
pub use hashing::{account_discriminator, hash, hashv, instruction_discriminator, Hash};
pub use keypair::Keypair;
pub use pda::{
    associated_token_address, create_program_address, credential_mint_address,
    find_program_address, issuer_registry_address, mint_address,
};
pub use pubkey::{Pubkey, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
pub use signature::Signature;
