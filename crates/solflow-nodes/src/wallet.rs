//! Wallet identity and signing nodes. Signing requires a signer capability
//! on the execution context; without one these fail with a capability
//! error instead of silently doing nothing.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};

pub struct WalletConnect;

#[async_trait]
impl Node for WalletConnect {
    fn node_type(&self) -> &str {
        "wallet-connect"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .output(Port::new("publicKey", "Public Key", DataType::Publickey))
            .output(Port::new("connected", "Is Connected", DataType::Boolean))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let wallet = ctx.context.wallet();
        let public_key = wallet
            .address
            .as_ref()
            .map(|a| Value::from(a.as_str()))
            .unwrap_or(Value::Null);
        Ok(NodeOutput::new()
            .with("publicKey", public_key)
            .with("connected", wallet.is_connected))
    }
}

pub struct WalletSign;

#[async_trait]
impl Node for WalletSign {
    fn node_type(&self) -> &str {
        "wallet-sign"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("transaction", "Transaction", DataType::Transaction).required())
            .output(Port::new(
                "signedTransaction",
                "Signed Transaction",
                DataType::Transaction,
            ))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let transaction = ctx.require_transaction("transaction")?;
        let signer = ctx.context.signer().ok_or_else(|| {
            NodeError::CapabilityUnavailable(
                "wallet does not support transaction signing".to_string(),
            )
        })?;
        let signed = signer.sign_transaction(transaction).await?;
        Ok(NodeOutput::new().with("signedTransaction", signed))
    }
}

pub struct WalletSignMessage;

#[async_trait]
impl Node for WalletSignMessage {
    fn node_type(&self) -> &str {
        "wallet-sign-message"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("message", "Message", DataType::String).required())
            .output(Port::new("signature", "Signature", DataType::String))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let message = ctx.require_str("message")?;
        let signer = ctx.context.signer().ok_or_else(|| {
            NodeError::CapabilityUnavailable("wallet does not support message signing".to_string())
        })?;
        let signature = signer.sign_message(message.as_bytes()).await?;
        Ok(NodeOutput::new().with("signature", STANDARD.encode(signature)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;
    use solflow_core::solana::{Pubkey, Transaction, SYSTEM_PROGRAM_ID};
    use solflow_core::{
        EventBus, ExecutionContext, RunId, WalletIdentity, WalletSigner,
    };
    use std::sync::Arc;

    struct FixedSigner;

    #[async_trait]
    impl WalletSigner for FixedSigner {
        async fn sign_transaction(&self, tx: &Transaction) -> Result<Transaction, NodeError> {
            let mut signed = tx.clone();
            signed.signatures.push(bs58::encode([1u8; 64]).into_string());
            Ok(signed)
        }

        async fn sign_message(&self, _message: &[u8]) -> Result<Vec<u8>, NodeError> {
            Ok(vec![7u8; 64])
        }
    }

    fn signing_ctx(inputs: &[(&str, Value)]) -> NodeContext {
        let bus = EventBus::default();
        let wallet = WalletIdentity::connected(Pubkey::parse(SYSTEM_PROGRAM_ID).unwrap());
        NodeContext {
            node_id: "test".to_string(),
            inputs: inputs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            context: Arc::new(
                ExecutionContext::new("http://localhost:8899")
                    .with_wallet(wallet)
                    .with_signer(Arc::new(FixedSigner)),
            ),
            events: bus.emitter(RunId::new_v4(), "test".to_string()),
        }
    }

    #[tokio::test]
    async fn connect_reads_identity_off_the_context() {
        let out = WalletConnect.execute(signing_ctx(&[])).await.unwrap();
        assert_eq!(out.outputs["publicKey"], Value::from(SYSTEM_PROGRAM_ID));
        assert_eq!(out.outputs["connected"], Value::Bool(true));
    }

    #[tokio::test]
    async fn connect_without_wallet_reports_disconnected() {
        let out = WalletConnect.execute(ctx(&[])).await.unwrap();
        assert_eq!(out.outputs["publicKey"], Value::Null);
        assert_eq!(out.outputs["connected"], Value::Bool(false));
    }

    #[tokio::test]
    async fn sign_without_capability_fails() {
        let payer = Pubkey::parse(SYSTEM_PROGRAM_ID).unwrap();
        let tx = Transaction::new(payer, bs58::encode([7u8; 32]).into_string());
        let err = WalletSign
            .execute(ctx(&[("transaction", Value::Transaction(tx))]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::CapabilityUnavailable(_)));
    }

    #[tokio::test]
    async fn sign_appends_a_signature() {
        let payer = Pubkey::parse(SYSTEM_PROGRAM_ID).unwrap();
        let tx = Transaction::new(payer, bs58::encode([7u8; 32]).into_string());
        let out = WalletSign
            .execute(signing_ctx(&[("transaction", Value::Transaction(tx))]))
            .await
            .unwrap();
        let signed = out.outputs["signedTransaction"].as_transaction().unwrap();
        assert_eq!(signed.signatures.len(), 1);
    }

    #[tokio::test]
    async fn sign_message_emits_base64() {
        let out = WalletSignMessage
            .execute(signing_ctx(&[("message", Value::from("hello"))]))
            .await
            .unwrap();
        assert_eq!(
            out.outputs["signature"],
            Value::from(STANDARD.encode(vec![7u8; 64]))
        );
    }
}
