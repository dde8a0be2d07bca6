//! JSON-RPC transport to a cluster.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use passport_crypto::{Hash, Pubkey, Signature};

use crate::error::{ClientError, ProgramError};

/// Runtime message for a fee payer with no lamports.
const NO_PRIOR_CREDIT: &str = "Attempt to debit an account but found no record of a prior credit";

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct RpcAccount {
    lamports: u64,
    owner: String,
    data: (String, String),
    executable: bool,
}

#[derive(Deserialize)]
struct RpcKeyedAccount {
    pubkey: String,
    account: RpcAccount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlockhash {
    blockhash: String,
    last_valid_block_height: u64,
}

/// Status of a submitted transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    /// Whether the status has reached `commitment`.
    pub fn meets(&self, commitment: &str) -> bool {
        let rank = |level: &str| match level {
            "processed" => 0,
            "confirmed" => 1,
            "finalized" => 2,
            _ => 1,
        };
        match &self.confirmation_status {
            Some(status) => rank(status) >= rank(commitment),
            // Older nodes report `confirmations: null` once rooted.
            None => self.confirmations.is_none(),
        }
    }
}

/// A decoded account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
    pub executable: bool,
}

impl TryFrom<RpcAccount> for AccountInfo {
    type Error = ClientError;

    fn try_from(account: RpcAccount) -> Result<Self, Self::Error> {
        let (encoded, encoding) = account.data;
        if encoding != "base64" {
            return Err(ClientError::InvalidAccountData(format!(
                "unexpected account encoding {}",
                encoding
            )));
        }
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ClientError::InvalidAccountData(e.to_string()))?;
        Ok(Self {
            lamports: account.lamports,
            owner: account.owner.parse()?,
            data,
            executable: account.executable,
        })
    }
}

/// `memcmp` filter for `getProgramAccounts`.
#[derive(Debug, Clone)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// Map a transaction error value (`{"InstructionError":[0,{"Custom":6001}]}`
/// and friends) to a typed error.
pub fn decode_transaction_error(err: &Value) -> Option<ClientError> {
    if let Some(code) = err
        .get("InstructionError")
        .and_then(|ie| ie.get(1))
        .and_then(|detail| detail.get("Custom"))
        .and_then(Value::as_u64)
    {
        return Some(ClientError::Program(ProgramError::from_code(code as u32)));
    }
    match err.as_str() {
        Some("AccountNotFound" | "InsufficientFundsForFee" | "InsufficientFundsForRent") => {
            Some(ClientError::InsufficientFunds)
        }
        _ => None,
    }
}

fn map_rpc_error(error: RpcErrorObject) -> ClientError {
    let logs_mention_debit = error
        .data
        .as_ref()
        .and_then(|d| d.get("logs"))
        .and_then(Value::as_array)
        .is_some_and(|logs| {
            logs.iter()
                .filter_map(Value::as_str)
                .any(|line| line.contains(NO_PRIOR_CREDIT))
        });
    if error.message.contains(NO_PRIOR_CREDIT) || logs_mention_debit {
        return ClientError::InsufficientFunds;
    }
    if let Some(mapped) = error
        .data
        .as_ref()
        .and_then(|d| d.get("err"))
        .and_then(decode_transaction_error)
    {
        return mapped;
    }
    ClientError::Rpc {
        code: error.code,
        message: error.message,
    }
}

/// JSON-RPC client for one cluster endpoint.
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    commitment: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, commitment: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            commitment: commitment.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn commitment(&self) -> &str {
        &self.commitment
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        tracing::debug!(method, id, url = %self.url, "rpc request");

        let resp = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("could not reach {}: {}", self.url, e)))?;
        let status = resp.status();
        let body: RpcResponse<T> = resp.json().await.map_err(|e| {
            ClientError::Transport(format!(
                "invalid response from {} (HTTP {}): {}",
                self.url, status, e
            ))
        })?;

        if let Some(error) = body.error {
            tracing::debug!(method, code = error.code, message = %error.message, "rpc error");
            return Err(map_rpc_error(error));
        }
        body.result.ok_or_else(|| ClientError::Rpc {
            code: 0,
            message: format!("{} returned no result", method),
        })
    }

    /// Fetch an account, `None` when it does not exist.
    pub async fn get_account_info(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AccountInfo>, ClientError> {
        let resp: WithContext<Option<RpcAccount>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), {"encoding": "base64", "commitment": self.commitment}]),
            )
            .await?;
        resp.value.map(AccountInfo::try_from).transpose()
    }

    /// Balance in lamports.
    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError> {
        let resp: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), {"commitment": self.commitment}]),
            )
            .await?;
        Ok(resp.value)
    }

    pub async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        let sig: String = self
            .call(
                "requestAirdrop",
                json!([address.to_string(), lamports, {"commitment": self.commitment}]),
            )
            .await?;
        Ok(sig.parse()?)
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        let resp: WithContext<RpcBlockhash> = self
            .call("getLatestBlockhash", json!([{"commitment": self.commitment}]))
            .await?;
        let blockhash: Pubkey = resp.value.blockhash.parse()?;
        tracing::trace!(
            blockhash = %blockhash,
            last_valid_block_height = resp.value.last_valid_block_height,
            "latest blockhash"
        );
        Ok(blockhash.to_bytes())
    }

    /// Submit a base64-encoded transaction with preflight simulation.
    pub async fn send_transaction(&self, encoded: &str) -> Result<Signature, ClientError> {
        let sig: String = self
            .call(
                "sendTransaction",
                json!([encoded, {"encoding": "base64", "preflightCommitment": self.commitment}]),
            )
            .await?;
        Ok(sig.parse()?)
    }

    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, ClientError> {
        let resp: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], {"searchTransactionHistory": false}]),
            )
            .await?;
        Ok(resp.value.into_iter().next().flatten())
    }

    /// Poll until `signature` reaches the client commitment, failing with
    /// `ConfirmationTimeout` after `attempts` polls.
    pub async fn confirm_transaction(
        &self,
        signature: &Signature,
        attempts: u32,
        interval: Duration,
    ) -> Result<(), ClientError> {
        for attempt in 1..=attempts.max(1) {
            if let Some(status) = self.get_signature_status(signature).await? {
                if let Some(err) = &status.err {
                    return Err(decode_transaction_error(err).unwrap_or_else(|| {
                        ClientError::TransactionFailed {
                            signature: signature.to_string(),
                            reason: err.to_string(),
                        }
                    }));
                }
                if status.meets(&self.commitment) {
                    tracing::debug!(
                        %signature,
                        slot = status.slot,
                        attempt,
                        "transaction confirmed"
                    );
                    return Ok(());
                }
            }
            tokio::time::sleep(interval).await;
        }
        Err(ClientError::ConfirmationTimeout(signature.to_string()))
    }

    /// Accounts owned by `program_id` with exactly `data_size` bytes that
    /// match every `memcmp` filter.
    pub async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: Option<usize>,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, AccountInfo)>, ClientError> {
        let mut rpc_filters: Vec<Value> = filters
            .iter()
            .map(|f| {
                json!({"memcmp": {
                    "offset": f.offset,
                    "bytes": bs58::encode(&f.bytes).into_string(),
                }})
            })
            .collect();
        if let Some(size) = data_size {
            rpc_filters.push(json!({ "dataSize": size }));
        }

        let accounts: Vec<RpcKeyedAccount> = self
            .call(
                "getProgramAccounts",
                json!([program_id.to_string(), {
                    "encoding": "base64",
                    "commitment": self.commitment,
                    "filters": rpc_filters,
                }]),
            )
            .await?;

        accounts
            .into_iter()
            .map(|keyed| -> Result<(Pubkey, AccountInfo), ClientError> {
                Ok((keyed.pubkey.parse()?, AccountInfo::try_from(keyed.account)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: DeserializeOwned>(json: &str) -> RpcResponse<T> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_account_info_response() {
        let resp: RpcResponse<WithContext<Option<RpcAccount>>> = parse(
            r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":5},"value":{
                "data":["AQID","base64"],"executable":false,"lamports":1461600,
                "owner":"CTY5CyBk3JkGkqRLsAyqFp4V1RDdSabWTsT5uC1PANzw","rentEpoch":18446744073709551615,"space":3}}}"#,
        );
        let account = AccountInfo::try_from(resp.result.unwrap().value.unwrap()).unwrap();
        assert_eq!(account.data, vec![1, 2, 3]);
        assert_eq!(account.lamports, 1_461_600);
        assert_eq!(
            account.owner.to_string(),
            "CTY5CyBk3JkGkqRLsAyqFp4V1RDdSabWTsT5uC1PANzw"
        );
    }

    #[test]
    fn test_missing_account_is_none() {
        let resp: RpcResponse<WithContext<Option<RpcAccount>>> =
            parse(r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":5},"value":null}}"#);
        assert!(resp.result.unwrap().value.is_none());
    }

    #[test]
    fn test_custom_program_error() {
        let resp: RpcResponse<String> = parse(
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32002,
                "message":"Transaction simulation failed: Error processing Instruction 0: custom program error: 0x1771",
                "data":{"err":{"InstructionError":[0,{"Custom":6001}]},"logs":["Program log: AnchorError"]}}}"#,
        );
        let err = map_rpc_error(resp.error.unwrap());
        assert!(matches!(
            err,
            ClientError::Program(ProgramError::UnauthorizedIssuer)
        ));
    }

    #[test]
    fn test_no_prior_credit_is_insufficient_funds() {
        let resp: RpcResponse<String> = parse(
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32002,
                "message":"Transaction simulation failed: Attempt to debit an account but found no record of a prior credit.",
                "data":{"err":"AccountNotFound","logs":[]}}}"#,
        );
        assert!(matches!(
            map_rpc_error(resp.error.unwrap()),
            ClientError::InsufficientFunds
        ));
    }

    #[test]
    fn test_plain_rpc_error() {
        let resp: RpcResponse<String> =
            parse(r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32602,"message":"Invalid params"}}"#);
        assert!(matches!(
            map_rpc_error(resp.error.unwrap()),
            ClientError::Rpc { code: -32602, .. }
        ));
    }

    #[test]
    fn test_signature_status_commitment() {
        let status: SignatureStatus = serde_json::from_str(
            r#"{"slot":10,"confirmations":1,"err":null,"confirmationStatus":"confirmed"}"#,
        )
        .unwrap();
        assert!(status.meets("confirmed"));
        assert!(status.meets("processed"));
        assert!(!status.meets("finalized"));
    }

    #[test]
    fn test_decode_transaction_error_unknown() {
        assert!(decode_transaction_error(&json!("BlockhashNotFound")).is_none());
        assert!(matches!(
            decode_transaction_error(&json!({"InstructionError": [1, {"Custom": 3012}]})),
            Some(ClientError::Program(ProgramError::Other(3012)))
        ));
    }
}
