/// Key, signature, and address-derivation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("too many seeds or a seed longer than 32 bytes")]
    MaxSeedLengthExceeded,

    #[error("seeds hash to a point on the curve")]
    InvalidSeeds,

    #[error("no viable bump seed for program address")]
    NoViableBump,

    #[error("keypair file error: {0}")]
    KeypairFile(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
