//! Pure source nodes: no inbound edges, the resolved input map is exactly
//! the node's literal configuration.

use async_trait::async_trait;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port};

pub struct StringInput;

#[async_trait]
impl Node for StringInput {
    fn node_type(&self) -> &str {
        "input-string"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new().output(Port::new("value", "Value", DataType::String))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx
            .input("value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(NodeOutput::new().with("value", value))
    }
}

pub struct NumberInput;

#[async_trait]
impl Node for NumberInput {
    fn node_type(&self) -> &str {
        "input-number"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new().output(Port::new("value", "Value", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("value", ctx.number("value")))
    }
}

pub struct PubkeyInput;

#[async_trait]
impl Node for PubkeyInput {
    fn node_type(&self) -> &str {
        "input-publickey"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new().output(Port::new("publicKey", "Public Key", DataType::Publickey))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        // passed through as-is; consumers validate when they use it
        let value = ctx
            .input("publicKey")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(NodeOutput::new().with("publicKey", value))
    }
}

pub struct BooleanInput;

#[async_trait]
impl Node for BooleanInput {
    fn node_type(&self) -> &str {
        "input-boolean"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new().output(Port::new("value", "Value", DataType::Boolean))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("value", ctx.truthy("value")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;
    use solflow_core::Value;

    #[tokio::test]
    async fn inputs_echo_their_literal_values() {
        let out = NumberInput
            .execute(ctx(&[("value", Value::Number(3.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["value"], Value::Number(3.0));

        let out = StringInput.execute(ctx(&[])).await.unwrap();
        assert_eq!(out.outputs["value"], Value::from(""));

        let out = BooleanInput
            .execute(ctx(&[("value", Value::Bool(true))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["value"], Value::Bool(true));
    }
}
