//! Decoders for the credential program's accounts.
//!
//! Layout: 8-byte `account:<Name>` discriminator, then Borsh fields in
//! declaration order. Accounts are allocated at their maximum size, so
//! data past the last field is zero padding.

use bytes::{Buf, BufMut, BytesMut};
use chrono::{DateTime, Utc};

pub use passport_core::{MAX_NAME_LEN, MAX_SYMBOL_LEN, MAX_URI_LEN};

use passport_core::CredentialType;
use passport_crypto::{account_discriminator, Pubkey};

use crate::error::ClientError;
use crate::instruction::put_borsh_string;

/// Maximum number of verified issuers the registry holds.
pub const MAX_ISSUERS: usize = 10;

/// Byte offset of `CredentialMint::student`, for `memcmp` lookups.
pub const CREDENTIAL_STUDENT_OFFSET: usize = 8 + 32;

fn invalid(msg: impl Into<String>) -> ClientError {
    ClientError::InvalidAccountData(msg.into())
}

fn ensure(buf: &&[u8], needed: usize, field: &str) -> Result<(), ClientError> {
    if buf.remaining() < needed {
        return Err(invalid(format!(
            "truncated at {}: need {} bytes, have {}",
            field,
            needed,
            buf.remaining()
        )));
    }
    Ok(())
}

fn check_discriminator(buf: &mut &[u8], name: &str) -> Result<(), ClientError> {
    ensure(buf, 8, "discriminator")?;
    let expected = account_discriminator(name);
    if buf[..8] != expected {
        return Err(invalid(format!("not a {} account", name)));
    }
    buf.advance(8);
    Ok(())
}

fn get_pubkey(buf: &mut &[u8], field: &str) -> Result<Pubkey, ClientError> {
    ensure(buf, 32, field)?;
    let mut bytes = [0u8; 32];
    buf.copy_to_slice(&mut bytes);
    Ok(Pubkey::new_from_array(bytes))
}

fn get_u8(buf: &mut &[u8], field: &str) -> Result<u8, ClientError> {
    ensure(buf, 1, field)?;
    Ok(buf.get_u8())
}

fn get_bool(buf: &mut &[u8], field: &str) -> Result<bool, ClientError> {
    match get_u8(buf, field)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(invalid(format!("{}: invalid bool byte {}", field, other))),
    }
}

fn get_string(buf: &mut &[u8], field: &str, max_len: usize) -> Result<String, ClientError> {
    ensure(buf, 4, field)?;
    let len = buf.get_u32_le() as usize;
    if len > max_len {
        return Err(invalid(format!("{} is {} bytes, max {}", field, len, max_len)));
    }
    ensure(buf, len, field)?;
    let value = String::from_utf8(buf[..len].to_vec())
        .map_err(|_| invalid(format!("{} is not UTF-8", field)))?;
    buf.advance(len);
    Ok(value)
}

/// The singleton list of wallets allowed to mint credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerRegistry {
    pub authority: Pubkey,
    pub verified_issuers: Vec<Pubkey>,
    pub bump: u8,
}

impl IssuerRegistry {
    pub const NAME: &'static str = "IssuerRegistry";
    /// Allocated account size.
    pub const SPACE: usize = 8 + 32 + (4 + 32 * MAX_ISSUERS) + 1;

    pub fn decode(data: &[u8]) -> Result<Self, ClientError> {
        let mut buf = data;
        check_discriminator(&mut buf, Self::NAME)?;

        let authority = get_pubkey(&mut buf, "authority")?;
        ensure(&buf, 4, "verified_issuers")?;
        let count = buf.get_u32_le() as usize;
        if count > MAX_ISSUERS {
            return Err(invalid(format!("{} verified issuers, max {}", count, MAX_ISSUERS)));
        }
        let verified_issuers = (0..count)
            .map(|_| get_pubkey(&mut buf, "verified_issuers"))
            .collect::<Result<Vec<_>, _>>()?;
        let bump = get_u8(&mut buf, "bump")?;

        Ok(Self {
            authority,
            verified_issuers,
            bump,
        })
    }

    /// Encode in the program's layout, padded to [`Self::SPACE`].
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::SPACE);
        buf.put_slice(&account_discriminator(Self::NAME));
        buf.put_slice(self.authority.as_ref());
        buf.put_u32_le(self.verified_issuers.len() as u32);
        for issuer in &self.verified_issuers {
            buf.put_slice(issuer.as_ref());
        }
        buf.put_u8(self.bump);
        if buf.len() < Self::SPACE {
            buf.resize(Self::SPACE, 0);
        }
        buf.to_vec()
    }

    pub fn is_verified(&self, issuer: &Pubkey) -> bool {
        self.verified_issuers.contains(issuer)
    }

    pub fn is_full(&self) -> bool {
        self.verified_issuers.len() >= MAX_ISSUERS
    }
}

/// One issued credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialMint {
    pub authority: Pubkey,
    pub student: Pubkey,
    pub mint: Pubkey,
    pub credential_type: CredentialType,
    /// Unix seconds.
    pub issued_at: i64,
    pub issuer: Pubkey,
    pub is_revoked: bool,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub bump: u8,
}

impl CredentialMint {
    pub const NAME: &'static str = "CredentialMint";
    pub const SPACE: usize = 8
        + 32 * 3
        + 1
        + 8
        + 32
        + 1
        + (4 + MAX_NAME_LEN)
        + (4 + MAX_SYMBOL_LEN)
        + (4 + MAX_URI_LEN)
        + 1;

    pub fn decode(data: &[u8]) -> Result<Self, ClientError> {
        let mut buf = data;
        check_discriminator(&mut buf, Self::NAME)?;

        let authority = get_pubkey(&mut buf, "authority")?;
        let student = get_pubkey(&mut buf, "student")?;
        let mint = get_pubkey(&mut buf, "mint")?;
        let credential_type = CredentialType::from_u8(get_u8(&mut buf, "credential_type")?)
            .map_err(|e| invalid(e.to_string()))?;
        ensure(&buf, 8, "issued_at")?;
        let issued_at = buf.get_i64_le();
        let issuer = get_pubkey(&mut buf, "issuer")?;
        let is_revoked = get_bool(&mut buf, "is_revoked")?;
        let name = get_string(&mut buf, "name", MAX_NAME_LEN)?;
        let symbol = get_string(&mut buf, "symbol", MAX_SYMBOL_LEN)?;
        let uri = get_string(&mut buf, "uri", MAX_URI_LEN)?;
        let bump = get_u8(&mut buf, "bump")?;

        Ok(Self {
            authority,
            student,
            mint,
            credential_type,
            issued_at,
            issuer,
            is_revoked,
            name,
            symbol,
            uri,
            bump,
        })
    }

    /// Encode in the program's layout, padded to [`Self::SPACE`].
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::SPACE);
        buf.put_slice(&account_discriminator(Self::NAME));
        buf.put_slice(self.authority.as_ref());
        buf.put_slice(self.student.as_ref());
        buf.put_slice(self.mint.as_ref());
        buf.put_u8(self.credential_type.as_u8());
        buf.put_i64_le(self.issued_at);
        buf.put_slice(self.issuer.as_ref());
        buf.put_u8(self.is_revoked as u8);
        put_borsh_string(&mut buf, &self.name);
        put_borsh_string(&mut buf, &self.symbol);
        put_borsh_string(&mut buf, &self.uri);
        buf.put_u8(self.bump);
        if buf.len() < Self::SPACE {
            buf.resize(Self::SPACE, 0);
        }
        buf.to_vec()
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.issued_at, 0)
    }

    /// Whether the credential is valid, i.e. not revoked.
    pub fn is_active(&self) -> bool {
        !self.is_revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_credential() -> CredentialMint {
        CredentialMint {
            authority: Pubkey::new_from_array([1u8; 32]),
            student: Pubkey::new_from_array([2u8; 32]),
            mint: Pubkey::new_from_array([3u8; 32]),
            credential_type: CredentialType::Course,
            issued_at: 1_700_000_000,
            issuer: Pubkey::new_from_array([4u8; 32]),
            is_revoked: false,
            name: "Blockchain Fundamentals".into(),
            symbol: "BLOCKCHAIN".into(),
            uri: "ipfs://course/blockchain-101/1700000000000".into(),
            bump: 254,
        }
    }

    #[test]
    fn test_space_matches_allocation() {
        assert_eq!(IssuerRegistry::SPACE, 365);
        assert_eq!(CredentialMint::SPACE, 265);
    }

    #[test]
    fn test_registry_layout() {
        let registry = IssuerRegistry {
            authority: Pubkey::new_from_array([9u8; 32]),
            verified_issuers: vec![Pubkey::new_from_array([7u8; 32])],
            bump: 255,
        };
        let data = registry.encode();
        assert_eq!(data.len(), IssuerRegistry::SPACE);
        assert_eq!(&data[..8], &[252, 217, 20, 87, 39, 96, 228, 46]);
        assert_eq!(&data[40..44], &[1, 0, 0, 0]);
        assert_eq!(data[76], 255);

        let decoded = IssuerRegistry::decode(&data).unwrap();
        assert_eq!(decoded, registry);
        assert!(decoded.is_verified(&Pubkey::new_from_array([7u8; 32])));
        assert!(!decoded.is_full());
    }

    #[test]
    fn test_credential_layout() {
        let credential = sample_credential();
        let data = credential.encode();
        assert_eq!(data.len(), CredentialMint::SPACE);
        assert_eq!(&data[..8], &[238, 26, 57, 27, 254, 89, 58, 152]);
        assert_eq!(
            &data[CREDENTIAL_STUDENT_OFFSET..CREDENTIAL_STUDENT_OFFSET + 32],
            credential.student.as_ref()
        );

        let decoded = CredentialMint::decode(&data).unwrap();
        assert_eq!(decoded, credential);
        assert_eq!(
            decoded.issued_at_utc().unwrap().timestamp(),
            1_700_000_000
        );
        assert!(decoded.is_active());
    }

    #[test]
    fn test_wrong_discriminator() {
        let data = sample_credential().encode();
        assert!(matches!(
            IssuerRegistry::decode(&data),
            Err(ClientError::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_truncated() {
        let data = sample_credential().encode();
        assert!(matches!(
            CredentialMint::decode(&data[..100]),
            Err(ClientError::InvalidAccountData(_))
        ));
        assert!(CredentialMint::decode(&[]).is_err());
    }

    #[test]
    fn test_invalid_credential_type() {
        let mut data = sample_credential().encode();
        data[8 + 96] = 3;
        assert!(matches!(
            CredentialMint::decode(&data),
            Err(ClientError::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_oversized_issuer_list() {
        let mut data = IssuerRegistry {
            authority: Pubkey::default(),
            verified_issuers: vec![],
            bump: 1,
        }
        .encode();
        data[40..44].copy_from_slice(&11u32.to_le_bytes());
        assert!(IssuerRegistry::decode(&data).is_err());
    }
}
