//! Legacy transaction format.
//!
//! Wire layout: `compact-u16 signature count, signatures, message`, where
//! the message is `header, compact-u16 key count, keys, recent blockhash,
//! compact-u16 instruction count, instructions`. Keys are ordered writable
//! signers, readonly signers, writable non-signers, readonly non-signers,
//! with the fee payer first.

use base64::Engine;
use bytes::{BufMut, BytesMut};

use passport_crypto::{Hash, Keypair, Pubkey, Signature};

use crate::error::ClientError;
use crate::instruction::Instruction;

/// Maximum serialized transaction size accepted by the cluster.
pub const PACKET_DATA_SIZE: usize = 1232;

/// Append `value` as a compact-u16: 7 bits per byte, low bits first, high
/// bit set on every byte but the last.
pub fn put_compact_u16(buf: &mut BytesMut, value: u16) {
    let mut rem = value;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            buf.put_u8(byte);
            return;
        }
        byte |= 0x80;
        buf.put_u8(byte);
    }
}

fn compact_len(len: usize, what: &str) -> Result<u16, ClientError> {
    u16::try_from(len)
        .map_err(|_| ClientError::InvalidRequest(format!("too many {}: {}", what, len)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with accounts replaced by indices into the key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

struct KeyEntry {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Compile `instructions` with `payer` as the first writable signer.
    pub fn new(
        instructions: &[Instruction],
        payer: &Pubkey,
        recent_blockhash: Hash,
    ) -> Result<Self, ClientError> {
        let mut entries: Vec<KeyEntry> = vec![KeyEntry {
            pubkey: *payer,
            is_signer: true,
            is_writable: true,
        }];
        let mut upsert = |pubkey: Pubkey, is_signer: bool, is_writable: bool| {
            match entries.iter_mut().find(|e| e.pubkey == pubkey) {
                Some(entry) => {
                    entry.is_signer |= is_signer;
                    entry.is_writable |= is_writable;
                }
                None => entries.push(KeyEntry {
                    pubkey,
                    is_signer,
                    is_writable,
                }),
            }
        };
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        // Stable partition keeps the payer first among writable signers.
        let group = |e: &KeyEntry| -> u8 {
            match (e.is_signer, e.is_writable) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            }
        };
        entries.sort_by_key(group);

        let count = |g: u8| entries.iter().filter(|e| group(e) == g).count();
        let header = MessageHeader {
            num_required_signatures: u8::try_from(count(0) + count(1))
                .map_err(|_| ClientError::InvalidRequest("too many signers".into()))?,
            num_readonly_signed_accounts: count(1) as u8,
            num_readonly_unsigned_accounts: u8::try_from(count(3))
                .map_err(|_| ClientError::InvalidRequest("too many readonly accounts".into()))?,
        };
        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
        if account_keys.len() > u8::MAX as usize + 1 {
            return Err(ClientError::InvalidRequest(format!(
                "too many accounts: {}",
                account_keys.len()
            )));
        }

        let index_of = |key: &Pubkey| -> u8 {
            account_keys
                .iter()
                .position(|k| k == key)
                .map_or(0, |i| i as u8)
        };
        let instructions = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// Keys that must sign, in signature order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.header.num_required_signatures as usize]
    }

    /// The bytes every signer signs.
    pub fn serialize(&self) -> Result<Vec<u8>, ClientError> {
        let mut buf = BytesMut::with_capacity(PACKET_DATA_SIZE);
        buf.put_u8(self.header.num_required_signatures);
        buf.put_u8(self.header.num_readonly_signed_accounts);
        buf.put_u8(self.header.num_readonly_unsigned_accounts);

        put_compact_u16(&mut buf, compact_len(self.account_keys.len(), "accounts")?);
        for key in &self.account_keys {
            buf.put_slice(key.as_ref());
        }
        buf.put_slice(&self.recent_blockhash);

        put_compact_u16(&mut buf, compact_len(self.instructions.len(), "instructions")?);
        for ix in &self.instructions {
            buf.put_u8(ix.program_id_index);
            put_compact_u16(&mut buf, compact_len(ix.accounts.len(), "instruction accounts")?);
            buf.put_slice(&ix.accounts);
            put_compact_u16(&mut buf, compact_len(ix.data.len(), "instruction data bytes")?);
            buf.put_slice(&ix.data);
        }
        Ok(buf.to_vec())
    }
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Compile and sign. `signers` must cover every required signer; the
    /// first signer pays fees.
    pub fn new_signed(
        instructions: &[Instruction],
        signers: &[&Keypair],
        recent_blockhash: Hash,
    ) -> Result<Self, ClientError> {
        let payer = signers
            .first()
            .ok_or_else(|| ClientError::InvalidRequest("a transaction needs a fee payer".into()))?
            .pubkey();
        let message = Message::new(instructions, &payer, recent_blockhash)?;
        let bytes = message.serialize()?;

        let signatures = message
            .signer_keys()
            .iter()
            .map(|key| {
                signers
                    .iter()
                    .find(|kp| kp.pubkey() == *key)
                    .map(|kp| kp.sign(&bytes))
                    .ok_or_else(|| ClientError::InvalidRequest(format!("missing signer {}", key)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            signatures,
            message,
        })
    }

    /// The transaction id: the fee payer's signature.
    pub fn signature(&self) -> Signature {
        self.signatures.first().copied().unwrap_or_default()
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ClientError> {
        let mut buf = BytesMut::with_capacity(PACKET_DATA_SIZE);
        put_compact_u16(&mut buf, compact_len(self.signatures.len(), "signatures")?);
        for sig in &self.signatures {
            buf.put_slice(sig.as_ref());
        }
        buf.put_slice(&self.message.serialize()?);

        if buf.len() > PACKET_DATA_SIZE {
            return Err(ClientError::InvalidRequest(format!(
                "transaction is {} bytes, limit is {}",
                buf.len(),
                PACKET_DATA_SIZE
            )));
        }
        Ok(buf.to_vec())
    }

    /// Base64 wire encoding for `sendTransaction`.
    pub fn to_base64(&self) -> Result<String, ClientError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.serialize()?))
    }
}
