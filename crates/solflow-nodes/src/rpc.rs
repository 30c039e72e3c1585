//! RPC read nodes. Each one reuses the run's lazily-created connection;
//! the first RPC node to execute pays the construction cost.

use async_trait::async_trait;
use solflow_core::solana::lamports_to_sol;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};

/// Establishes (or reuses) the run's connection and emits a connection
/// marker downstream. The RPC endpoint is fixed per run on the execution
/// context; a wired endpoint value does not rebind it.
pub struct RpcConnection;

#[async_trait]
impl Node for RpcConnection {
    fn node_type(&self) -> &str {
        "rpc-connection"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("endpoint", "Endpoint", DataType::String).required())
            .output(Port::new("connection", "Connection", DataType::Connection))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let rpc = ctx.context.connection().await?;
        Ok(NodeOutput::new().with("connection", rpc.endpoint().to_string()))
    }
}

pub struct GetBalance;

#[async_trait]
impl Node for GetBalance {
    fn node_type(&self) -> &str {
        "get-balance"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .input(Port::new("publicKey", "Public Key", DataType::Publickey).required())
            .output(Port::new("balance", "Balance (SOL)", DataType::Number))
            .output(Port::new("lamports", "Lamports", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let pubkey = ctx.require_pubkey("publicKey")?;
        let rpc = ctx.context.connection().await?;
        let lamports = rpc.get_balance(&pubkey).await?;
        Ok(NodeOutput::new()
            .with("balance", lamports_to_sol(lamports))
            .with("lamports", lamports as f64))
    }
}

pub struct GetAccountInfo;

#[async_trait]
impl Node for GetAccountInfo {
    fn node_type(&self) -> &str {
        "get-account-info"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .input(Port::new("publicKey", "Public Key", DataType::Publickey).required())
            .output(Port::new("accountInfo", "Account Info", DataType::Account))
            .output(Port::new("owner", "Owner", DataType::Publickey))
            .output(Port::new("lamports", "Lamports", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let pubkey = ctx.require_pubkey("publicKey")?;
        let rpc = ctx.context.connection().await?;

        match rpc.get_account_info(&pubkey).await? {
            None => Ok(NodeOutput::new()
                .with("accountInfo", Value::Null)
                .with("owner", Value::Null)
                .with("lamports", 0.0)),
            Some(info) => {
                let owner = info.owner.clone();
                let lamports = info.lamports as f64;
                let account = serde_json::json!({
                    "lamports": info.lamports,
                    "owner": info.owner,
                    "executable": info.executable,
                    "data": info.data,
                });
                Ok(NodeOutput::new()
                    .with("accountInfo", Value::from(account))
                    .with("owner", owner)
                    .with("lamports", lamports))
            }
        }
    }
}

pub struct GetSlot;

#[async_trait]
impl Node for GetSlot {
    fn node_type(&self) -> &str {
        "get-slot"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .output(Port::new("slot", "Slot", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let rpc = ctx.context.connection().await?;
        Ok(NodeOutput::new().with("slot", rpc.get_slot().await? as f64))
    }
}

pub struct GetBlockHeight;

#[async_trait]
impl Node for GetBlockHeight {
    fn node_type(&self) -> &str {
        "get-block-height"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .output(Port::new("blockHeight", "Block Height", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let rpc = ctx.context.connection().await?;
        Ok(NodeOutput::new().with("blockHeight", rpc.get_block_height().await? as f64))
    }
}

pub struct GetRecentBlockhash;

#[async_trait]
impl Node for GetRecentBlockhash {
    fn node_type(&self) -> &str {
        "get-recent-blockhash"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .output(Port::new("blockhash", "Blockhash", DataType::String))
            .output(Port::new(
                "lastValidBlockHeight",
                "Last Valid Block Height",
                DataType::Number,
            ))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let rpc = ctx.context.connection().await?;
        let latest = rpc.get_latest_blockhash().await?;
        Ok(NodeOutput::new()
            .with("blockhash", latest.blockhash)
            .with("lastValidBlockHeight", latest.last_valid_block_height as f64))
    }
}
