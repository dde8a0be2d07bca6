pub mod add_issuer;
pub mod airdrop;
pub mod courses;
pub mod credentials;
pub mod derive;
pub mod init_registry;
pub mod mint;
pub mod progress;
pub mod remove_issuer;
pub mod revoke;
pub mod status;
pub mod verify;
