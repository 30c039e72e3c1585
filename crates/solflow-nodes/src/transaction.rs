//! Transaction assembly and submission. Everything here is pure data
//! shuffling except `send-transaction`, which submits and waits for
//! confirmation as one atomic dispatch step.

use async_trait::async_trait;
use solflow_core::solana::{sol_to_lamports, system_transfer, Transaction};
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port};

pub struct CreateTransaction;

#[async_trait]
impl Node for CreateTransaction {
    fn node_type(&self) -> &str {
        "create-transaction"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("feePayer", "Fee Payer", DataType::Publickey).required())
            .input(Port::new("blockhash", "Blockhash", DataType::String).required())
            .output(Port::new("transaction", "Transaction", DataType::Transaction))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let fee_payer = ctx.require_pubkey("feePayer")?;
        let blockhash = ctx.require_str("blockhash")?;
        Ok(NodeOutput::new().with("transaction", Transaction::new(fee_payer, blockhash)))
    }
}

pub struct AddInstruction;

#[async_trait]
impl Node for AddInstruction {
    fn node_type(&self) -> &str {
        "add-instruction"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("transaction", "Transaction", DataType::Transaction).required())
            .input(Port::new("instruction", "Instruction", DataType::Instruction).required())
            .output(Port::new("transaction", "Transaction", DataType::Transaction))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let mut transaction = ctx.require_transaction("transaction")?.clone();
        let instruction = ctx.require_instruction("instruction")?.clone();
        transaction.add(instruction);
        Ok(NodeOutput::new().with("transaction", transaction))
    }
}

/// Builds a native SOL transfer instruction. The amount is in SOL;
/// fractional lamports floor away.
pub struct TransferSol;

#[async_trait]
impl Node for TransferSol {
    fn node_type(&self) -> &str {
        "transfer-sol"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("from", "From", DataType::Publickey).required())
            .input(Port::new("to", "To", DataType::Publickey).required())
            .input(Port::new("amount", "Amount (SOL)", DataType::Number).required())
            .output(Port::new("instruction", "Instruction", DataType::Instruction))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let from = ctx.require_pubkey("from")?;
        let to = ctx.require_pubkey("to")?;
        let amount = ctx.number("amount");
        if amount <= 0.0 {
            return Err(NodeError::InvalidValue(
                "amount must be greater than 0".to_string(),
            ));
        }
        let instruction = system_transfer(&from, &to, sol_to_lamports(amount));
        Ok(NodeOutput::new().with("instruction", instruction))
    }
}

/// Submits a signed transaction and waits for confirmation. There is no
/// node boundary between submit and confirm.
pub struct SendTransaction;

#[async_trait]
impl Node for SendTransaction {
    fn node_type(&self) -> &str {
        "send-transaction"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("connection", "Connection", DataType::Connection).required())
            .input(Port::new("transaction", "Transaction", DataType::Transaction).required())
            .output(Port::new("signature", "Signature", DataType::String))
            .output(Port::new("confirmed", "Confirmed", DataType::Boolean))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let transaction = ctx.require_transaction("transaction")?;
        let rpc = ctx.context.connection().await?;

        let signature = rpc.send_transaction(&transaction.encode_base64()?).await?;
        ctx.events.info(format!("submitted {signature}; waiting for confirmation"));
        let confirmed = rpc.confirm_signature(&signature).await?;

        Ok(NodeOutput::new()
            .with("signature", signature)
            .with("confirmed", confirmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;
    use solflow_core::solana::{Instruction, Pubkey, SYSTEM_PROGRAM_ID};
    use solflow_core::Value;

    fn pubkey(seed: u8) -> Pubkey {
        Pubkey::parse(&bs58::encode([seed; 32]).into_string()).unwrap()
    }

    fn blockhash() -> String {
        bs58::encode([9u8; 32]).into_string()
    }

    #[tokio::test]
    async fn create_then_add_builds_the_instruction_list() {
        let out = CreateTransaction
            .execute(ctx(&[
                ("feePayer", Value::from(pubkey(1).as_str())),
                ("blockhash", Value::from(blockhash())),
            ]))
            .await
            .unwrap();
        let tx = out.outputs["transaction"].as_transaction().unwrap().clone();
        assert!(tx.instructions.is_empty());

        let transfer = system_transfer(&pubkey(1), &pubkey(2), 5);
        let out = AddInstruction
            .execute(ctx(&[
                ("transaction", Value::Transaction(tx)),
                ("instruction", Value::Instruction(transfer.clone())),
            ]))
            .await
            .unwrap();
        let tx = out.outputs["transaction"].as_transaction().unwrap();
        assert_eq!(tx.instructions, vec![transfer]);
    }

    #[tokio::test]
    async fn create_requires_a_valid_fee_payer() {
        let err = CreateTransaction
            .execute(ctx(&[
                ("feePayer", Value::from("garbage")),
                ("blockhash", Value::from(blockhash())),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn add_instruction_rejects_a_non_transaction() {
        let transfer: Instruction = system_transfer(&pubkey(1), &pubkey(2), 5);
        let err = AddInstruction
            .execute(ctx(&[
                ("transaction", Value::from("not a transaction")),
                ("instruction", Value::Instruction(transfer)),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidInputType { .. }));
    }

    #[tokio::test]
    async fn transfer_sol_floors_to_lamports() {
        let out = TransferSol
            .execute(ctx(&[
                ("from", Value::from(pubkey(1).as_str())),
                ("to", Value::from(pubkey(2).as_str())),
                ("amount", Value::Number(0.5)),
            ]))
            .await
            .unwrap();
        let instruction = out.outputs["instruction"].as_instruction().unwrap();
        assert_eq!(instruction.program_id.as_str(), SYSTEM_PROGRAM_ID);
        assert_eq!(&instruction.data[4..], &500_000_000u64.to_le_bytes());
    }

    #[tokio::test]
    async fn transfer_sol_rejects_non_positive_amounts() {
        let err = TransferSol
            .execute(ctx(&[
                ("from", Value::from(pubkey(1).as_str())),
                ("to", Value::from(pubkey(2).as_str())),
                ("amount", Value::Number(0.0)),
            ]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            NodeError::InvalidValue("amount must be greater than 0".to_string())
        );
    }
}
