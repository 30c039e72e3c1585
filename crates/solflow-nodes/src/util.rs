use async_trait::async_trait;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};
use tokio::time::{sleep, Duration};

/// Delays the run, then passes its input through unchanged.
pub struct Delay;

#[async_trait]
impl Node for Delay {
    fn node_type(&self) -> &str {
        "utility-delay"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("input", "Input", DataType::Any).required())
            .input(
                Port::new("ms", "Milliseconds", DataType::Number)
                    .required()
                    .with_default(1000.0),
            )
            .output(Port::new("output", "Output", DataType::Any))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let ms = match ctx.number("ms") {
            n if n <= 0.0 => 1000,
            n => n as u64,
        };
        let input = ctx.input("input").cloned().unwrap_or(Value::Null);

        ctx.events.info(format!("delaying for {ms}ms"));
        sleep(Duration::from_millis(ms)).await;

        Ok(NodeOutput::new().with("output", input))
    }
}

pub struct JsonParse;

#[async_trait]
impl Node for JsonParse {
    fn node_type(&self) -> &str {
        "utility-json-parse"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("json", "JSON String", DataType::String).required())
            .output(Port::new("object", "Object", DataType::Object))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let raw = ctx.require_str("json")?;
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| NodeError::InvalidValue(format!("JSON parse error: {e}")))?;
        Ok(NodeOutput::new().with("object", Value::from(parsed)))
    }
}

pub struct JsonStringify;

#[async_trait]
impl Node for JsonStringify {
    fn node_type(&self) -> &str {
        "utility-json-stringify"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("object", "Object", DataType::Object).required())
            .output(Port::new("json", "JSON String", DataType::String))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_input("object")?;
        let json = serde_json::to_string(&value.to_json())
            .map_err(|e| NodeError::InvalidValue(format!("JSON stringify error: {e}")))?;
        Ok(NodeOutput::new().with("json", json))
    }
}

/// Reads one property off an object; absent keys yield null.
pub struct GetProperty;

#[async_trait]
impl Node for GetProperty {
    fn node_type(&self) -> &str {
        "utility-get-property"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("object", "Object", DataType::Object).required())
            .input(Port::new("key", "Key", DataType::String).required())
            .output(Port::new("value", "Value", DataType::Any))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let key = ctx.require_str("key")?;
        let value = ctx
            .input("object")
            .and_then(|v| v.as_object())
            .and_then(|map| map.get(key))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(NodeOutput::new().with("value", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;
    use std::collections::HashMap;

    #[tokio::test]
    async fn json_parse_round_trips_through_stringify() {
        let out = JsonParse
            .execute(ctx(&[("json", Value::from(r#"{"a":1,"b":[true,null]}"#))]))
            .await
            .unwrap();
        let object = out.outputs["object"].clone();
        assert_eq!(
            object.as_object().unwrap()["b"].as_array().unwrap()[0],
            Value::Bool(true)
        );

        let out = JsonStringify
            .execute(ctx(&[("object", Value::Number(5.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["json"], Value::from("5"));
    }

    #[tokio::test]
    async fn json_parse_rejects_malformed_input() {
        let err = JsonParse
            .execute(ctx(&[("json", Value::from("{nope"))]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn get_property_reads_a_key() {
        let object = Value::Object(HashMap::from([(
            "name".to_string(),
            Value::from("solflow"),
        )]));
        let out = GetProperty
            .execute(ctx(&[("object", object.clone()), ("key", Value::from("name"))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["value"], Value::from("solflow"));

        let out = GetProperty
            .execute(ctx(&[("object", object), ("key", Value::from("missing"))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["value"], Value::Null);
    }

    #[tokio::test]
    async fn delay_passes_its_input_through() {
        let out = Delay
            .execute(ctx(&[
                ("input", Value::from("payload")),
                ("ms", Value::Number(1.0)),
            ]))
            .await
            .unwrap();
        assert_eq!(out.outputs["output"], Value::from("payload"));
    }
}
