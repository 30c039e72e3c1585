use async_trait::async_trait;
use solflow_core::solana::{lamports_to_sol, sol_to_lamports};
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port};

fn binary_ports() -> NodePorts {
    NodePorts::new()
        .input(Port::new("a", "A", DataType::Number).required())
        .input(Port::new("b", "B", DataType::Number).required())
        .output(Port::new("result", "Result", DataType::Number))
}

pub struct Add;

#[async_trait]
impl Node for Add {
    fn node_type(&self) -> &str {
        "math-add"
    }

    fn ports(&self) -> NodePorts {
        binary_ports()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("result", ctx.number("a") + ctx.number("b")))
    }
}

pub struct Subtract;

#[async_trait]
impl Node for Subtract {
    fn node_type(&self) -> &str {
        "math-subtract"
    }

    fn ports(&self) -> NodePorts {
        binary_ports()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("result", ctx.number("a") - ctx.number("b")))
    }
}

pub struct Multiply;

#[async_trait]
impl Node for Multiply {
    fn node_type(&self) -> &str {
        "math-multiply"
    }

    fn ports(&self) -> NodePorts {
        binary_ports()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("result", ctx.number("a") * ctx.number("b")))
    }
}

/// Division fails explicitly on a zero denominator rather than producing
/// infinity.
pub struct Divide;

#[async_trait]
impl Node for Divide {
    fn node_type(&self) -> &str {
        "math-divide"
    }

    fn ports(&self) -> NodePorts {
        binary_ports()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let a = ctx.number("a");
        let b = ctx.number("b");
        if b == 0.0 {
            return Err(NodeError::InvalidValue("division by zero".to_string()));
        }
        Ok(NodeOutput::new().with("result", a / b))
    }
}

pub struct LamportsToSol;

#[async_trait]
impl Node for LamportsToSol {
    fn node_type(&self) -> &str {
        "lamports-to-sol"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("lamports", "Lamports", DataType::Number).required())
            .output(Port::new("sol", "SOL", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let lamports = ctx.number("lamports").max(0.0) as u64;
        Ok(NodeOutput::new().with("sol", lamports_to_sol(lamports)))
    }
}

pub struct SolToLamports;

#[async_trait]
impl Node for SolToLamports {
    fn node_type(&self) -> &str {
        "sol-to-lamports"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("sol", "SOL", DataType::Number).required())
            .output(Port::new("lamports", "Lamports", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("lamports", sol_to_lamports(ctx.number("sol"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;
    use solflow_core::Value;

    #[tokio::test]
    async fn add_sums_its_inputs() {
        let out = Add
            .execute(ctx(&[("a", Value::Number(10.0)), ("b", Value::Number(2.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::Number(12.0));
    }

    #[tokio::test]
    async fn missing_operands_coerce_to_zero() {
        let out = Subtract
            .execute(ctx(&[("a", Value::Number(4.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::Number(4.0));
    }

    #[tokio::test]
    async fn divide_computes_quotient() {
        let out = Divide
            .execute(ctx(&[("a", Value::Number(10.0)), ("b", Value::Number(2.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::Number(5.0));
    }

    #[tokio::test]
    async fn divide_by_zero_fails() {
        let err = Divide
            .execute(ctx(&[("a", Value::Number(1.0)), ("b", Value::Number(0.0))]))
            .await
            .unwrap_err();
        assert_eq!(err, NodeError::InvalidValue("division by zero".to_string()));
    }

    #[tokio::test]
    async fn lamport_conversions_round_trip() {
        let out = SolToLamports
            .execute(ctx(&[("sol", Value::Number(1.5))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["lamports"], Value::Number(1_500_000_000.0));

        let out = LamportsToSol
            .execute(ctx(&[("lamports", Value::Number(250_000_000.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["sol"], Value::Number(0.25));
    }
}
