//! Display/log sinks. Their outputs are pass-through markers only; they
//! exist for the side effect of being captured for presentation.

use async_trait::async_trait;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};

pub struct Display;

#[async_trait]
impl Node for Display {
    fn node_type(&self) -> &str {
        "output-display"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("value", "Value", DataType::Any).required())
            .output(Port::new("displayValue", "Display Value", DataType::Any))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.input("value").cloned().unwrap_or(Value::Null);
        Ok(NodeOutput::new().with("displayValue", value))
    }
}

pub struct Log;

#[async_trait]
impl Node for Log {
    fn node_type(&self) -> &str {
        "output-log"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("value", "Value", DataType::Any).required())
            .input(Port::new("label", "Label", DataType::String))
            .output(Port::new("logged", "Logged", DataType::Boolean))
            .output(Port::new("value", "Value", DataType::Any))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.input("value").cloned().unwrap_or(Value::Null);
        let label = ctx
            .input("label")
            .and_then(|v| v.as_str())
            .unwrap_or("Log")
            .to_string();

        let rendered = value.to_json().to_string();
        tracing::info!(node = %ctx.node_id, "[{label}]: {rendered}");
        ctx.events.info(format!("[{label}]: {rendered}"));

        Ok(NodeOutput::new().with("logged", true).with("value", value))
    }
}
