use async_trait::async_trait;

use passport_crypto::{
    account_discriminator, associated_token_address, credential_mint_address,
    issuer_registry_address, mint_address, Keypair, Pubkey, Signature,
};

use crate::accounts::{CredentialMint, IssuerRegistry, CREDENTIAL_STUDENT_OFFSET};
use crate::error::ClientError;
use crate::instruction::{self, Instruction};
use crate::rpc::{AccountInfo, MemcmpFilter, RpcClient};
use crate::transaction::Transaction;

use super::{
    ConfirmPolicy, MintCredentialRequest, MintCredentialResponse, PassportProgram,
    RevokeCredentialRequest,
};

/// [`PassportProgram`] over JSON-RPC, signing with a local keypair.
pub struct RpcPassportProgram {
    rpc: RpcClient,
    program_id: Pubkey,
    payer: Option<Keypair>,
    confirm: ConfirmPolicy,
}

impl RpcPassportProgram {
    /// A read-only client; state-changing calls need [`Self::with_payer`].
    pub fn new(rpc: RpcClient, program_id: Pubkey) -> Self {
        Self {
            rpc,
            program_id,
            payer: None,
            confirm: ConfirmPolicy::default(),
        }
    }

    pub fn with_payer(mut self, payer: Keypair) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn with_confirm_policy(mut self, confirm: ConfirmPolicy) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    fn signer(&self) -> Result<&Keypair, ClientError> {
        self.payer
            .as_ref()
            .ok_or_else(|| ClientError::InvalidRequest("this operation needs a keypair".into()))
    }

    /// Sign, submit and confirm `instructions` with the payer.
    async fn send(&self, instructions: &[Instruction]) -> Result<Signature, ClientError> {
        let payer = self.signer()?;
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let tx = Transaction::new_signed(instructions, &[payer], blockhash)?;
        let signature = self.rpc.send_transaction(&tx.to_base64()?).await?;

        tracing::info!(%signature, payer = %payer.pubkey(), "transaction submitted");
        self.rpc
            .confirm_transaction(&signature, self.confirm.attempts, self.confirm.interval)
            .await?;
        Ok(signature)
    }

    /// Fetch an account the program owns, `None` when it does not exist.
    async fn owned_account(&self, address: &Pubkey) -> Result<Option<AccountInfo>, ClientError> {
        match self.rpc.get_account_info(address).await? {
            Some(account) if account.owner != self.program_id => {
                Err(ClientError::InvalidAccountData(format!(
                    "{} is owned by {}, not the credential program",
                    address, account.owner
                )))
            }
            other => Ok(other),
        }
    }
}

#[async_trait]
impl PassportProgram for RpcPassportProgram {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn payer(&self) -> Option<Pubkey> {
        self.payer.as_ref().map(Keypair::pubkey)
    }

    async fn initialize_registry(&self) -> Result<Signature, ClientError> {
        let authority = self.signer()?.pubkey();
        let ix = instruction::initialize_issuer_registry(&self.program_id, &authority)?;
        self.send(&[ix]).await
    }

    async fn add_issuer(&self, issuer: &Pubkey) -> Result<Signature, ClientError> {
        let authority = self.signer()?.pubkey();
        let ix = instruction::add_verified_issuer(&self.program_id, &authority, issuer)?;
        self.send(&[ix]).await
    }

    async fn remove_issuer(&self, issuer: &Pubkey) -> Result<Signature, ClientError> {
        let authority = self.signer()?.pubkey();
        let ix = instruction::remove_verified_issuer(&self.program_id, &authority, issuer)?;
        self.send(&[ix]).await
    }

    async fn mint_credential(
        &self,
        request: &MintCredentialRequest,
    ) -> Result<MintCredentialResponse, ClientError> {
        request.validate()?;
        let issuer = self.signer()?.pubkey();
        let ix = instruction::mint_credential(
            &self.program_id,
            &issuer,
            &request.student,
            request.credential_type,
            &request.name,
            &request.symbol,
            &request.uri,
        )?;

        let (credential_mint, _) =
            credential_mint_address(&issuer, &request.student, &self.program_id)?;
        let (mint, _) = mint_address(&credential_mint, &self.program_id)?;
        let token_account = associated_token_address(&request.student, &mint)?;

        tracing::debug!(
            %issuer,
            student = %request.student,
            %credential_mint,
            %mint,
            "minting credential"
        );
        let signature = self.send(&[ix]).await?;

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
        let issuer = self.signer()?.pubkey();
        let ix = instruction::revoke_credential(&self.program_id, &issuer, &request.student)?;
        self.send(&[ix]).await
    }

    async fn fetch_registry(&self) -> Result<Option<IssuerRegistry>, ClientError> {
        let (address, _) = issuer_registry_address(&self.program_id)?;
        self.owned_account(&address)
            .await?
            .map(|account| IssuerRegistry::decode(&account.data))
            .transpose()
    }

    async fn fetch_credential(
        &self,
        address: &Pubkey,
    ) -> Result<Option<CredentialMint>, ClientError> {
        self.owned_account(address)
            .await?
            .map(|account| CredentialMint::decode(&account.data))
            .transpose()
    }

    async fn credentials_for_student(
        &self,
        student: &Pubkey,
    ) -> Result<Vec<(Pubkey, CredentialMint)>, ClientError> {
        let filters = [
            MemcmpFilter {
                offset: 0,
                bytes: account_discriminator(CredentialMint::NAME).to_vec(),
            },
            MemcmpFilter {
                offset: CREDENTIAL_STUDENT_OFFSET,
                bytes: student.to_bytes().to_vec(),
            },
        ];
        let accounts = self
            .rpc
            .get_program_accounts(&self.program_id, Some(CredentialMint::SPACE), &filters)
            .await?;

        let mut credentials = Vec::with_capacity(accounts.len());
        for (address, account) in accounts {
            match CredentialMint::decode(&account.data) {
                Ok(credential) => credentials.push((address, credential)),
                Err(e) => {
                    tracing::warn!(%address, error = %e, "skipping undecodable credential account")
                }
            }
        }
        credentials.sort_by_key(|(_, c)| std::cmp::Reverse(c.issued_at));
        Ok(credentials)
    }

    async fn balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        self.rpc.get_balance(address).await
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        let signature = self.rpc.request_airdrop(address, lamports).await?;
        tracing::info!(%signature, %address, lamports, "airdrop requested");
        self.rpc
            .confirm_transaction(&signature, self.confirm.attempts, self.confirm.interval)
            .await?;
        Ok(signature)
    }
}
