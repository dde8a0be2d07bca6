use sha2::{Digest, Sha256};

/// SHA-256 digest (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using SHA-256.
pub fn hash(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// SHA-256 over the concatenation of `parts`.
pub fn hashv(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = hashv(&[namespace.as_bytes(), b":", name.as_bytes()]);
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Anchor instruction discriminator: `SHA-256("global:<name>")[..8]`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

/// Anchor account discriminator: `SHA-256("account:<Name>")[..8]`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_known_vector() {
        // SHA-256("abc")
        let h = hash(b"abc");
        assert_eq!(h[..4], [0xba, 0x78, 0x16, 0xbf]);
        assert_eq!(h[28..], [0xf2, 0x00, 0x15, 0xad]);
    }

    #[test]
    fn test_hashv_matches_concatenation() {
        assert_eq!(hashv(&[b"issuer", b"-", b"registry"]), hash(b"issuer-registry"));
        assert_eq!(hashv(&[]), hash(b""));
    }

    #[test]
    fn test_instruction_discriminators() {
        assert_eq!(
            instruction_discriminator("initialize_issuer_registry"),
            [157, 206, 75, 32, 236, 128, 138, 167]
        );
        assert_eq!(
            instruction_discriminator("add_verified_issuer"),
            [108, 136, 243, 198, 159, 195, 60, 192]
        );
        assert_eq!(
            instruction_discriminator("mint_credential"),
            [136, 108, 131, 240, 163, 102, 204, 13]
        );
    }

    #[test]
    fn test_account_discriminators() {
        assert_eq!(
            account_discriminator("IssuerRegistry"),
            [252, 217, 20, 87, 39, 96, 228, 46]
        );
        assert_eq!(
            account_discriminator("CredentialMint"),
            [238, 26, 57, 27, 254, 89, 58, 152]
        );
    }
}
