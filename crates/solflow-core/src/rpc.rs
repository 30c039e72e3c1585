//! Thin Solana JSON-RPC client covering the read and submit calls the
//! node library needs. One client per run, reused across nodes.

use crate::solana::{Pubkey, TOKEN_PROGRAM_ID};
use crate::NodeError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{sleep, Duration};

pub struct RpcClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// `result` payloads that come wrapped in a slot context.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: String,
    pub executable: bool,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount: Option<f64>,
}

/// One parsed token account from `getTokenAccountsByOwner`.
#[derive(Debug, Clone)]
pub struct TokenAccount {
    pub address: String,
    pub mint: Option<String>,
    pub ui_amount: Option<f64>,
    pub decimals: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    confirmation_status: Option<String>,
    err: Option<serde_json::Value>,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, NodeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(%method, "rpc request");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| NodeError::Rpc(format!("{method}: {e}")))?;

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| NodeError::Rpc(format!("{method}: malformed response: {e}")))?;

        if let Some(err) = envelope.error {
            return Err(NodeError::Rpc(format!(
                "{method}: {} (code {})",
                err.message, err.code
            )));
        }
        let result = envelope
            .result
            .ok_or_else(|| NodeError::Rpc(format!("{method}: response missing result")))?;
        serde_json::from_value(result)
            .map_err(|e| NodeError::Rpc(format!("{method}: malformed result: {e}")))
    }

    /// Balance in lamports.
    pub async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, NodeError> {
        let wrapped: WithContext<u64> = self
            .call("getBalance", json!([pubkey.as_str()]))
            .await?;
        Ok(wrapped.value)
    }

    /// Account info with jsonParsed encoding; `None` if the account does
    /// not exist.
    pub async fn get_account_info(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<AccountInfo>, NodeError> {
        let wrapped: WithContext<Option<AccountInfo>> = self
            .call(
                "getAccountInfo",
                json!([pubkey.as_str(), {"encoding": "jsonParsed"}]),
            )
            .await?;
        Ok(wrapped.value)
    }

    pub async fn get_slot(&self) -> Result<u64, NodeError> {
        self.call("getSlot", json!([])).await
    }

    pub async fn get_block_height(&self) -> Result<u64, NodeError> {
        self.call("getBlockHeight", json!([])).await
    }

    pub async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, NodeError> {
        let wrapped: WithContext<LatestBlockhash> =
            self.call("getLatestBlockhash", json!([])).await?;
        Ok(wrapped.value)
    }

    /// All SPL token accounts owned by `owner`, parsed.
    pub async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<TokenAccount>, NodeError> {
        let wrapped: WithContext<Vec<serde_json::Value>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([
                    owner.as_str(),
                    {"programId": TOKEN_PROGRAM_ID},
                    {"encoding": "jsonParsed"},
                ]),
            )
            .await?;

        let accounts = wrapped
            .value
            .iter()
            .map(|entry| {
                let info = &entry["account"]["data"]["parsed"]["info"];
                TokenAccount {
                    address: entry["pubkey"].as_str().unwrap_or_default().to_string(),
                    mint: info["mint"].as_str().map(str::to_string),
                    ui_amount: info["tokenAmount"]["uiAmount"].as_f64(),
                    decimals: info["tokenAmount"]["decimals"].as_u64().map(|d| d as u8),
                }
            })
            .collect();
        Ok(accounts)
    }

    pub async fn get_token_account_balance(
        &self,
        account: &Pubkey,
    ) -> Result<TokenAmount, NodeError> {
        let wrapped: WithContext<TokenAmount> = self
            .call("getTokenAccountBalance", json!([account.as_str()]))
            .await?;
        Ok(wrapped.value)
    }

    /// Submit a base64-encoded signed transaction; returns the signature.
    pub async fn send_transaction(&self, transaction_base64: &str) -> Result<String, NodeError> {
        self.call(
            "sendTransaction",
            json!([transaction_base64, {"encoding": "base64"}]),
        )
        .await
    }

    /// Wait until the cluster reports the signature confirmed or failed.
    /// Returns `Ok(false)` when the transaction landed with an on-chain
    /// error. No timeout here: a hung endpoint stalls the run, by design.
    pub async fn confirm_signature(&self, signature: &str) -> Result<bool, NodeError> {
        loop {
            let wrapped: WithContext<Vec<Option<SignatureStatus>>> = self
                .call("getSignatureStatuses", json!([[signature]]))
                .await?;
            if let Some(Some(status)) = wrapped.value.into_iter().next() {
                if status.err.is_some() {
                    return Ok(false);
                }
                if matches!(
                    status.confirmation_status.as_deref(),
                    Some("confirmed") | Some("finalized")
                ) {
                    return Ok(true);
                }
            }
            sleep(Duration::from_millis(400)).await;
        }
    }
}
