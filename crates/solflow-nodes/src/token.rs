//! SPL-token reads and transfer assembly, plus the Jupiter swap-route
//! quote lookup.

use async_trait::async_trait;
use solflow_core::solana::spl_token_transfer;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};
use std::collections::HashMap;

pub struct GetTokenAccounts;

#[async_trait]
impl Node for GetTokenAccounts {
    fn node_type(&self) -> &str {
        "get-token-accounts"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .input(Port::new("owner", "Owner", DataType::Publickey).required())
            .output(Port::new("accounts", "Token Accounts", DataType::Array))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let owner = ctx.require_pubkey("owner")?;
        let rpc = ctx.context.connection().await?;
        let accounts = rpc.get_token_accounts_by_owner(&owner).await?;

        let accounts: Vec<Value> = accounts
            .into_iter()
            .map(|account| {
                Value::Object(HashMap::from([
                    ("address".to_string(), Value::from(account.address)),
                    (
                        "mint".to_string(),
                        account.mint.map(Value::from).unwrap_or(Value::Null),
                    ),
                    (
                        "amount".to_string(),
                        account.ui_amount.map(Value::from).unwrap_or(Value::Null),
                    ),
                    (
                        "decimals".to_string(),
                        account
                            .decimals
                            .map(|d| Value::from(d as f64))
                            .unwrap_or(Value::Null),
                    ),
                ]))
            })
            .collect();
        Ok(NodeOutput::new().with("accounts", accounts))
    }
}

pub struct GetTokenBalance;

#[async_trait]
impl Node for GetTokenBalance {
    fn node_type(&self) -> &str {
        "get-token-balance"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .input(Port::new("tokenAccount", "Token Account", DataType::Publickey).required())
            .output(Port::new("balance", "Balance", DataType::Number))
            .output(Port::new("decimals", "Decimals", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let account = ctx.require_pubkey("tokenAccount")?;
        let rpc = ctx.context.connection().await?;
        let balance = rpc.get_token_account_balance(&account).await?;
        Ok(NodeOutput::new()
            .with("balance", balance.ui_amount.unwrap_or(0.0))
            .with("decimals", balance.decimals as f64))
    }
}

/// Builds an SPL token transfer instruction. The amount is in the token's
/// base units.
pub struct TransferToken;

#[async_trait]
impl Node for TransferToken {
    fn node_type(&self) -> &str {
        "transfer-token"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("source", "Source", DataType::Publickey).required())
            .input(Port::new("destination", "Destination", DataType::Publickey).required())
            .input(Port::new("owner", "Owner", DataType::Publickey).required())
            .input(Port::new("amount", "Amount", DataType::Number).required())
            .output(Port::new("instruction", "Instruction", DataType::Instruction))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let source = ctx.require_pubkey("source")?;
        let destination = ctx.require_pubkey("destination")?;
        let owner = ctx.require_pubkey("owner")?;
        let amount = ctx.number("amount");
        if amount <= 0.0 {
            return Err(NodeError::InvalidValue(
                "amount must be greater than 0".to_string(),
            ));
        }
        let instruction = spl_token_transfer(&source, &destination, &owner, amount as u64);
        Ok(NodeOutput::new().with("instruction", instruction))
    }
}

/// Reads parsed mint info off the chain. Fails when the account is not a
/// token mint.
pub struct GetTokenInfo;

#[async_trait]
impl Node for GetTokenInfo {
    fn node_type(&self) -> &str {
        "get-token-info"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .input(Port::new("mint", "Mint Address", DataType::Publickey).required())
            .output(Port::new("mintAuthority", "Mint Authority", DataType::Publickey))
            .output(Port::new("freezeAuthority", "Freeze Authority", DataType::Publickey))
            .output(Port::new("supply", "Supply", DataType::Number))
            .output(Port::new("decimals", "Decimals", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let mint = ctx.require_pubkey("mint")?;
        let rpc = ctx.context.connection().await?;

        let info = rpc
            .get_account_info(&mint)
            .await?
            .ok_or_else(|| NodeError::InvalidValue("not a valid token mint".to_string()))?;
        let parsed = &info.data["parsed"]["info"];
        if parsed.is_null() {
            return Err(NodeError::InvalidValue("not a valid token mint".to_string()));
        }

        let authority = |key: &str| {
            parsed[key]
                .as_str()
                .map(Value::from)
                .unwrap_or(Value::Null)
        };
        let supply = parsed["supply"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| parsed["supply"].as_f64())
            .unwrap_or(0.0);

        Ok(NodeOutput::new()
            .with("mintAuthority", authority("mintAuthority"))
            .with("freezeAuthority", authority("freezeAuthority"))
            .with("supply", supply)
            .with("decimals", parsed["decimals"].as_f64().unwrap_or(0.0)))
    }
}

/// Queries the Jupiter quote API for swap routes. Degrades to an empty
/// route list when the API is unavailable; a missing quote is a preview
/// gap, not a run failure.
pub struct CheckSwapRoutes {
    http: reqwest::Client,
}

impl CheckSwapRoutes {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for CheckSwapRoutes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for CheckSwapRoutes {
    fn node_type(&self) -> &str {
        "check-swap-routes"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("inputMint", "Input Mint", DataType::Publickey).required())
            .input(Port::new("outputMint", "Output Mint", DataType::Publickey).required())
            .input(Port::new("amount", "Amount", DataType::Number).required())
            .output(Port::new("routes", "Routes", DataType::Array))
            .output(Port::new("bestRoute", "Best Route", DataType::Object))
            .output(Port::new("priceImpact", "Price Impact %", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let input_mint = ctx.require_str("inputMint")?;
        let output_mint = ctx.require_str("outputMint")?;
        let amount = ctx.number("amount");
        if amount <= 0.0 {
            return Err(NodeError::InvalidValue(
                "amount must be greater than 0".to_string(),
            ));
        }

        let url = format!(
            "https://quote-api.jup.ag/v6/quote?inputMint={input_mint}&outputMint={output_mint}&amount={}",
            amount as u64
        );
        let quote: Result<serde_json::Value, _> = async {
            self.http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        }
        .await;

        match quote {
            Ok(data) => {
                let routes = match data["data"].clone() {
                    serde_json::Value::Null => Value::Array(Vec::new()),
                    other => Value::from(other),
                };
                let best = Value::from(data["data"][0].clone());
                let impact = data["data"][0]["priceImpactPct"]
                    .as_str()
                    .and_then(|s| s.parse::<f64>().ok())
                    .or_else(|| data["data"][0]["priceImpactPct"].as_f64())
                    .unwrap_or(0.0);
                Ok(NodeOutput::new()
                    .with("routes", routes)
                    .with("bestRoute", best)
                    .with("priceImpact", impact))
            }
            Err(error) => {
                ctx.events
                    .warn(format!("could not fetch swap routes: {error}"));
                Ok(NodeOutput::new()
                    .with("routes", Vec::<Value>::new())
                    .with("bestRoute", Value::Null)
                    .with("priceImpact", 0.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;
    use solflow_core::solana::TOKEN_PROGRAM_ID;

    fn pubkey_str(seed: u8) -> String {
        bs58::encode([seed; 32]).into_string()
    }

    #[tokio::test]
    async fn transfer_token_packs_base_units() {
        let out = TransferToken
            .execute(ctx(&[
                ("source", Value::from(pubkey_str(1))),
                ("destination", Value::from(pubkey_str(2))),
                ("owner", Value::from(pubkey_str(3))),
                ("amount", Value::Number(250.0)),
            ]))
            .await
            .unwrap();
        let instruction = out.outputs["instruction"].as_instruction().unwrap();
        assert_eq!(instruction.program_id.as_str(), TOKEN_PROGRAM_ID);
        assert_eq!(&instruction.data[1..], &250u64.to_le_bytes());
    }

    #[tokio::test]
    async fn transfer_token_requires_all_parties() {
        let err = TransferToken
            .execute(ctx(&[
                ("source", Value::from(pubkey_str(1))),
                ("amount", Value::Number(1.0)),
            ]))
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::MissingInput("destination".to_string()));
    }

    #[tokio::test]
    async fn swap_routes_rejects_non_positive_amounts() {
        let err = CheckSwapRoutes::new()
            .execute(ctx(&[
                ("inputMint", Value::from(pubkey_str(1))),
                ("outputMint", Value::from(pubkey_str(2))),
                ("amount", Value::Number(0.0)),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidValue(_)));
    }
}
