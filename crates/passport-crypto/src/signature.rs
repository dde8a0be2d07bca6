use std::fmt;
use std::str::FromStr;

use ed25519_dalek::Verifier;

use crate::error::CryptoError;
use crate::pubkey::Pubkey;

/// Ed25519 signature (64 bytes). Transaction ids are the base58 form of the
/// fee payer's signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new_from_array(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Create from raw bytes (64 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!("signature must be 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    /// Verify this signature over `message` against `pubkey`.
    pub fn verify(&self, message: &[u8], pubkey: &Pubkey) -> Result<(), CryptoError> {
        let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(pubkey.as_bytes())
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        let sig = ed25519_dalek::Signature::from_bytes(&self.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58 signature: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}
