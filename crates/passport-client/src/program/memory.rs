use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use passport_crypto::{
    account_discriminator, associated_token_address, credential_mint_address,
    issuer_registry_address, mint_address, Keypair, Pubkey, Signature,
};

use crate::accounts::{CredentialMint, IssuerRegistry, CREDENTIAL_STUDENT_OFFSET};
use crate::error::{ClientError, ProgramError};

use super::{
    MintCredentialRequest, MintCredentialResponse, PassportProgram, RevokeCredentialRequest,
};

/// Lamports charged per transaction.
pub const TX_FEE_LAMPORTS: u64 = 5_000;

/// Framework error raised when a `has_one` constraint fails.
const CONSTRAINT_HAS_ONE: u32 = 2001;

/// Token program error for burning more than the account holds.
const TOKEN_INSUFFICIENT_FUNDS: u32 = 1;

#[derive(Default)]
struct Ledger {
    /// Program-owned account data, in the program's layout.
    accounts: DashMap<Pubkey, Vec<u8>>,
    balances: DashMap<Pubkey, u64>,
    /// Credential token amounts by token account.
    tokens: DashMap<Pubkey, u64>,
    tx_count: AtomicU64,
}

/// In-process stand-in for the credential program.
///
/// Applies the program's authorization and uniqueness rules to accounts
/// held in memory, stored in the same byte layout the cluster returns.
/// Revocation burns the student's credential token, so revoking twice
/// fails in the burn rather than on the revoked flag.
/// Clients made with [`InMemoryProgram::connect`] share one ledger, so an
/// authority and an issuer can act on the same registry.
pub struct InMemoryProgram {
    program_id: Pubkey,
    payer: Keypair,
    ledger: Arc<Ledger>,
}

fn account_in_use(address: &Pubkey) -> ClientError {
    ClientError::Rpc {
        code: -32002,
        message: format!("Transaction simulation failed: account {} already in use", address),
    }
}

impl InMemoryProgram {
    pub fn new(program_id: Pubkey, payer: Keypair) -> Self {
        Self {
            program_id,
            payer,
            ledger: Arc::new(Ledger::default()),
        }
    }

    /// Another client on the same ledger, signing with `payer`.
    pub fn connect(&self, payer: Keypair) -> Self {
        Self {
            program_id: self.program_id,
            payer,
            ledger: Arc::clone(&self.ledger),
        }
    }

    /// Credit `lamports` to `address` without a transaction.
    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        *self.ledger.balances.entry(*address).or_insert(0) += lamports;
    }

    /// Number of transactions processed on the shared ledger.
    pub fn transaction_count(&self) -> u64 {
        self.ledger.tx_count.load(Ordering::SeqCst)
    }

    /// Charge the fee and issue a signature for a successful transaction.
    fn commit(&self, label: &str) -> Result<Signature, ClientError> {
        let payer = self.payer.pubkey();
        {
            let mut balance = self
                .ledger
                .balances
                .get_mut(&payer)
                .ok_or(ClientError::InsufficientFunds)?;
            if *balance < TX_FEE_LAMPORTS {
                return Err(ClientError::InsufficientFunds);
            }
            *balance -= TX_FEE_LAMPORTS;
        }
        let n = self.ledger.tx_count.fetch_add(1, Ordering::SeqCst);
        let signature = self.payer.sign(format!("{}:{}", label, n).as_bytes());
        tracing::debug!(%signature, label, "in-memory transaction");
        Ok(signature)
    }

    fn require_funds(&self) -> Result<(), ClientError> {
        let balance = self
            .ledger
            .balances
            .get(&self.payer.pubkey())
            .map_or(0, |b| *b);
        if balance < TX_FEE_LAMPORTS {
            return Err(ClientError::InsufficientFunds);
        }
        Ok(())
    }

    fn load_registry(&self) -> Result<(Pubkey, IssuerRegistry), ClientError> {
        let (address, _) = issuer_registry_address(&self.program_id)?;
        let data = self
            .ledger
            .accounts
            .get(&address)
            .map(|e| e.value().clone())
            .ok_or_else(|| ClientError::AccountNotFound(address.to_string()))?;
        Ok((address, IssuerRegistry::decode(&data)?))
    }

    fn update_registry<F>(&self, label: &str, apply: F) -> Result<Signature, ClientError>
    where
        F: FnOnce(&mut IssuerRegistry) -> Result<(), ClientError>,
    {
        self.require_funds()?;
        let (address, mut registry) = self.load_registry()?;
        if registry.authority != self.payer.pubkey() {
            return Err(ProgramError::Other(CONSTRAINT_HAS_ONE).into());
        }
        apply(&mut registry)?;
        self.ledger.accounts.insert(address, registry.encode());
        self.commit(label)
    }
}

#[async_trait]
impl PassportProgram for InMemoryProgram {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn payer(&self) -> Option<Pubkey> {
        Some(self.payer.pubkey())
    }

    async fn initialize_registry(&self) -> Result<Signature, ClientError> {
        self.require_funds()?;
        let (address, bump) = issuer_registry_address(&self.program_id)?;
        if self.ledger.accounts.contains_key(&address) {
            return Err(account_in_use(&address));
        }
        let registry = IssuerRegistry {
            authority: self.payer.pubkey(),
            verified_issuers: Vec::new(),
            bump,
        };
        self.ledger.accounts.insert(address, registry.encode());
        self.commit("initialize_issuer_registry")
    }

    async fn add_issuer(&self, issuer: &Pubkey) -> Result<Signature, ClientError> {
        self.update_registry("add_verified_issuer", |registry| {
            if registry.is_verified(issuer) {
                return Err(ProgramError::IssuerAlreadyExists.into());
            }
            if registry.is_full() {
                return Err(ProgramError::IssuerRegistryFull.into());
            }
            registry.verified_issuers.push(*issuer);
            Ok(())
        })
    }

    async fn remove_issuer(&self, issuer: &Pubkey) -> Result<Signature, ClientError> {
        self.update_registry("remove_verified_issuer", |registry| {
            registry.verified_issuers.retain(|k| k != issuer);
            Ok(())
        })
    }

    async fn mint_credential(
        &self,
        request: &MintCredentialRequest,
    ) -> Result<MintCredentialResponse, ClientError> {
        request.validate()?;
        self.require_funds()?;
        let issuer = self.payer.pubkey();
        let (_, registry) = self.load_registry()?;
        if !registry.is_verified(&issuer) {
            return Err(ProgramError::UnauthorizedIssuer.into());
        }

        let (credential_mint, bump) =
            credential_mint_address(&issuer, &request.student, &self.program_id)?;
        if self.ledger.accounts.contains_key(&credential_mint) {
            return Err(account_in_use(&credential_mint));
        }
        let (mint, _) = mint_address(&credential_mint, &self.program_id)?;
        let token_account = associated_token_address(&request.student, &mint)?;

        let record = CredentialMint {
            authority: registry.authority,
            student: request.student,
            mint,
            credential_type: request.credential_type,
            issued_at: Utc::now().timestamp(),
            issuer,
            is_revoked: false,
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            uri: request.uri.clone(),
            bump,
        };
        self.ledger.accounts.insert(credential_mint, record.encode());
        *self.ledger.tokens.entry(token_account).or_insert(0) += 1;
        let signature = self.commit("mint_credential")?;

        Ok(MintCredentialResponse {
            signature,
            credential_mint,
            mint,
            token_account,
        })
    }

    async fn revoke_credential(
        &self,
        request: &RevokeCredentialRequest,
    ) -> Result<Signature, ClientError> {
        self.require_funds()?;
        let issuer = self.payer.pubkey();
        let (address, _) = credential_mint_address(&issuer, &request.student, &self.program_id)?;
        let data = self
            .ledger
            .accounts
            .get(&address)
            .map(|e| e.value().clone())
            .ok_or_else(|| ClientError::AccountNotFound(address.to_string()))?;
        let mut record = CredentialMint::decode(&data)?;

        // The token burn is authorized by the student's wallet.
        if request.student != issuer {
            return Err(ClientError::Rpc {
                code: -32002,
                message: "Transaction simulation failed: missing required signature for instruction"
                    .into(),
            });
        }
        let (mint, _) = mint_address(&address, &self.program_id)?;
        let token_account = associated_token_address(&request.student, &mint)?;
        {
            let mut amount = self.ledger.tokens.entry(token_account).or_insert(0);
            if *amount == 0 {
                return Err(ProgramError::Other(TOKEN_INSUFFICIENT_FUNDS).into());
            }
            *amount -= 1;
        }

        record.is_revoked = true;
        self.ledger.accounts.insert(address, record.encode());
        self.commit("revoke_credential")
    }

    async fn fetch_registry(&self) -> Result<Option<IssuerRegistry>, ClientError> {
        match self.load_registry() {
            Ok((_, registry)) => Ok(Some(registry)),
            Err(ClientError::AccountNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_credential(
        &self,
        address: &Pubkey,
    ) -> Result<Option<CredentialMint>, ClientError> {
        self.ledger
            .accounts
            .get(address)
            .map(|e| CredentialMint::decode(e.value()))
            .transpose()
    }

    async fn credentials_for_student(
        &self,
        student: &Pubkey,
    ) -> Result<Vec<(Pubkey, CredentialMint)>, ClientError> {
        let discriminator = account_discriminator(CredentialMint::NAME);
        let student_range = CREDENTIAL_STUDENT_OFFSET..CREDENTIAL_STUDENT_OFFSET + 32;

        let mut credentials = self
            .ledger
            .accounts
            .iter()
            .filter(|e| {
                let data = e.value();
                data.len() == CredentialMint::SPACE
                    && data[..8] == discriminator
                    && data[student_range.clone()] == student.as_ref()[..]
            })
            .map(|e| -> Result<(Pubkey, CredentialMint), ClientError> {
                Ok((*e.key(), CredentialMint::decode(e.value())?))
            })
            .collect::<Result<Vec<_>, ClientError>>()?;
        credentials.sort_by_key(|(_, c)| std::cmp::Reverse(c.issued_at));
        Ok(credentials)
    }

    async fn balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        Ok(self.ledger.balances.get(address).map_or(0, |b| *b))
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        self.fund(address, lamports);
        let n = self.ledger.tx_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.payer.sign(format!("airdrop:{}:{}", address, n).as_bytes()))
    }
}
