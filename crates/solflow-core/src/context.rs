use crate::rpc::RpcClient;
use crate::solana::{Pubkey, Transaction};
use crate::NodeError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The wallet identity visible to a run. Mirrors what a wallet adapter
/// exposes: maybe an address, and a connected flag.
#[derive(Debug, Clone, Default)]
pub struct WalletIdentity {
    pub address: Option<Pubkey>,
    pub is_connected: bool,
}

impl WalletIdentity {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Pubkey) -> Self {
        Self {
            address: Some(address),
            is_connected: true,
        }
    }
}

/// Signing capability a host can attach to the context. Absent by default;
/// signing nodes fail with a capability error rather than silently no-op.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign_transaction(&self, tx: &Transaction) -> Result<Transaction, NodeError>;
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, NodeError>;
}

/// Run-scoped shared handles: the RPC endpoint, a lazily-created connection
/// bound to it, and the wallet identity. Shared by reference across every
/// node invocation of a run; only the connection cell mutates mid-run
/// (create once, reuse).
pub struct ExecutionContext {
    endpoint: String,
    wallet: WalletIdentity,
    signer: Option<Arc<dyn WalletSigner>>,
    connection: OnceCell<RpcClient>,
}

impl ExecutionContext {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            wallet: WalletIdentity::disconnected(),
            signer: None,
            connection: OnceCell::new(),
        }
    }

    pub fn with_wallet(mut self, wallet: WalletIdentity) -> Self {
        self.wallet = wallet;
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn WalletSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn wallet(&self) -> &WalletIdentity {
        &self.wallet
    }

    pub fn signer(&self) -> Option<&Arc<dyn WalletSigner>> {
        self.signer.as_ref()
    }

    /// The shared RPC connection, created on first use.
    pub async fn connection(&self) -> Result<&RpcClient, NodeError> {
        self.connection
            .get_or_try_init(|| async {
                if self.endpoint.is_empty() {
                    return Err(NodeError::Rpc("no RPC endpoint configured".to_string()));
                }
                tracing::debug!(endpoint = %self.endpoint, "creating RPC connection");
                Ok(RpcClient::new(&self.endpoint))
            })
            .await
    }
}
