use std::path::Path;

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::pubkey::Pubkey;
use crate::signature::Signature;

/// Ed25519 key pair for signing transactions.
/// Private key material is zeroized on drop by ed25519-dalek.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Create a key pair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Create from the 64-byte `secret || public` layout used by keypair
    /// files. The public half must match the secret.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let mut arr: [u8; 64] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 64,
            actual: bytes.len(),
        })?;
        let result = SigningKey::from_keypair_bytes(&arr)
            .map_err(|e| CryptoError::InvalidInput(format!("inconsistent keypair: {}", e)));
        arr.zeroize();
        Ok(Self {
            signing_key: result?,
        })
    }

    /// Load a keypair file: a JSON array of 64 byte values.
    pub fn read_from_file(path: &Path) -> Result<Self, CryptoError> {
        if !path.exists() {
            return Err(CryptoError::KeypairFile(format!(
                "keypair not found at {}",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut bytes: Vec<u8> = serde_json::from_str(&contents).map_err(|e| {
            CryptoError::KeypairFile(format!("{}: not a JSON byte array: {}", path.display(), e))
        })?;
        let keypair = Self::from_keypair_bytes(&bytes);
        bytes.zeroize();
        let keypair = keypair?;
        tracing::debug!(path = %path.display(), pubkey = %keypair.pubkey(), "loaded keypair");
        Ok(keypair)
    }

    /// Write the keypair in the same JSON format `read_from_file` accepts.
    pub fn write_to_file(&self, path: &Path) -> Result<(), CryptoError> {
        let mut bytes = self.signing_key.to_keypair_bytes().to_vec();
        let json = serde_json::to_string(&bytes)
            .map_err(|e| CryptoError::KeypairFile(e.to_string()));
        bytes.zeroize();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json?)?;
        Ok(())
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new_from_array(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair({})", self.pubkey())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("passport-keys-{}", rand::random::<u64>()))
            .join(name)
    }

    #[test]
    fn test_generate_unique() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        assert_ne!(kp1.pubkey(), kp2.pubkey());
    }

    #[test]
    fn test_from_seed_deterministic() {
        let seed = [7u8; 32];
        assert_eq!(
            Keypair::from_seed(&seed).pubkey(),
            Keypair::from_seed(&seed).pubkey()
        );
    }

    #[test]
    fn test_file_roundtrip() {
        let path = temp_path("id.json");
        let kp = Keypair::generate();
        kp.write_to_file(&path).unwrap();

        let loaded = Keypair::read_from_file(&path).unwrap();
        assert_eq!(loaded.pubkey(), kp.pubkey());

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_missing_file() {
        let result = Keypair::read_from_file(Path::new("/nonexistent/id.json"));
        assert!(matches!(result, Err(CryptoError::KeypairFile(_))));
    }

    #[test]
    fn test_malformed_file() {
        let path = temp_path("bad.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        assert!(matches!(
            Keypair::read_from_file(&path),
            Err(CryptoError::KeypairFile(_))
        ));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_wrong_length() {
        assert!(matches!(
            Keypair::from_keypair_bytes(&[1u8; 32]),
            Err(CryptoError::InvalidKeyLength { expected: 64, actual: 32 })
        ));
    }

    #[test]
    fn test_mismatched_public_half() {
        let kp = Keypair::from_seed(&[3u8; 32]);
        let other = Keypair::from_seed(&[4u8; 32]);
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&[3u8; 32]);
        bytes[32..].copy_from_slice(other.pubkey().as_bytes());
        assert!(Keypair::from_keypair_bytes(&bytes).is_err());
        assert_ne!(kp.pubkey(), other.pubkey());
    }
}
