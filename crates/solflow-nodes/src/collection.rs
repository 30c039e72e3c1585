//! Array and iteration helpers. The scheduler is a single sequential
//! pass, so the loop nodes compute their aggregate in one dispatch rather
//! than fanning the downstream subgraph out per element.

use async_trait::async_trait;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};
use std::collections::HashMap;

pub struct ForEach;

#[async_trait]
impl Node for ForEach {
    fn node_type(&self) -> &str {
        "loop-for-each"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("array", "Array", DataType::Array).required())
            .output(Port::new("item", "Current Item", DataType::Any))
            .output(Port::new("index", "Index", DataType::Number))
            .output(Port::new("result", "All Results", DataType::Array))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let array = ctx.require_array("array")?;

        let result: Vec<Value> = array
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Value::Object(HashMap::from([
                    ("item".to_string(), item.clone()),
                    ("index".to_string(), Value::Number(index as f64)),
                ]))
            })
            .collect();

        Ok(NodeOutput::new()
            .with("item", array.last().cloned().unwrap_or(Value::Null))
            .with("index", array.len() as f64 - 1.0)
            .with("result", result))
    }
}

pub struct Repeat;

#[async_trait]
impl Node for Repeat {
    fn node_type(&self) -> &str {
        "loop-repeat"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("times", "Times", DataType::Number).required())
            .input(Port::new("value", "Value", DataType::Any))
            .output(Port::new("index", "Current Index", DataType::Number))
            .output(Port::new("results", "All Results", DataType::Array))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let times = ctx.number("times").max(0.0) as usize;
        let value = ctx.input("value").cloned().unwrap_or(Value::Null);

        Ok(NodeOutput::new()
            .with("index", times as f64 - 1.0)
            .with("results", vec![value; times]))
    }
}

/// Generates `[start, end)` stepping by `step` (defaulting to 1).
pub struct Range;

#[async_trait]
impl Node for Range {
    fn node_type(&self) -> &str {
        "loop-range"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("start", "Start", DataType::Number).required())
            .input(Port::new("end", "End", DataType::Number).required())
            .input(Port::new("step", "Step", DataType::Number).with_default(1.0))
            .output(Port::new("array", "Array", DataType::Array))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let start = ctx.number("start");
        let end = ctx.number("end");
        let step = match ctx.number("step") {
            s if s == 0.0 => 1.0,
            s => s,
        };
        if step < 0.0 {
            return Err(NodeError::InvalidValue("step must be positive".to_string()));
        }

        let mut array = Vec::new();
        let mut i = start;
        while i < end {
            array.push(Value::Number(i));
            i += step;
        }
        Ok(NodeOutput::new().with("array", array))
    }
}

pub struct ArrayLength;

#[async_trait]
impl Node for ArrayLength {
    fn node_type(&self) -> &str {
        "array-length"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("array", "Array", DataType::Array).required())
            .output(Port::new("length", "Length", DataType::Number))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let array = ctx.require_array("array")?;
        Ok(NodeOutput::new().with("length", array.len() as f64))
    }
}

/// Indexing fails explicitly out of bounds.
pub struct ArrayGetItem;

#[async_trait]
impl Node for ArrayGetItem {
    fn node_type(&self) -> &str {
        "array-get-item"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("array", "Array", DataType::Array).required())
            .input(Port::new("index", "Index", DataType::Number).required())
            .output(Port::new("item", "Item", DataType::Any))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let array = ctx.require_array("array")?;
        let index = ctx.number("index") as i64;

        if index < 0 || index as usize >= array.len() {
            return Err(NodeError::InvalidValue(format!(
                "index {index} out of bounds (array length: {})",
                array.len()
            )));
        }
        Ok(NodeOutput::new().with("item", array[index as usize].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;

    fn numbers(values: &[f64]) -> Value {
        Value::Array(values.iter().copied().map(Value::Number).collect())
    }

    #[tokio::test]
    async fn for_each_reports_the_aggregate() {
        let out = ForEach
            .execute(ctx(&[("array", numbers(&[1.0, 2.0, 3.0]))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["item"], Value::Number(3.0));
        assert_eq!(out.outputs["index"], Value::Number(2.0));
        assert_eq!(out.outputs["result"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn for_each_requires_an_array() {
        let err = ForEach
            .execute(ctx(&[("array", Value::Number(1.0))]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidInputType { .. }));
    }

    #[tokio::test]
    async fn repeat_clones_the_value() {
        let out = Repeat
            .execute(ctx(&[
                ("times", Value::Number(3.0)),
                ("value", Value::from("x")),
            ]))
            .await
            .unwrap();
        assert_eq!(out.outputs["index"], Value::Number(2.0));
        let results = out.outputs["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|v| *v == Value::from("x")));
    }

    #[tokio::test]
    async fn range_generates_half_open_interval() {
        let out = Range
            .execute(ctx(&[
                ("start", Value::Number(0.0)),
                ("end", Value::Number(5.0)),
                ("step", Value::Number(2.0)),
            ]))
            .await
            .unwrap();
        assert_eq!(out.outputs["array"], numbers(&[0.0, 2.0, 4.0]));
    }

    #[tokio::test]
    async fn range_defaults_step_to_one() {
        let out = Range
            .execute(ctx(&[
                ("start", Value::Number(1.0)),
                ("end", Value::Number(4.0)),
            ]))
            .await
            .unwrap();
        assert_eq!(out.outputs["array"], numbers(&[1.0, 2.0, 3.0]));
    }

    #[tokio::test]
    async fn get_item_checks_bounds() {
        let array = numbers(&[10.0, 20.0]);
        let out = ArrayGetItem
            .execute(ctx(&[("array", array.clone()), ("index", Value::Number(1.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["item"], Value::Number(20.0));

        let err = ArrayGetItem
            .execute(ctx(&[("array", array), ("index", Value::Number(2.0))]))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidValue(_)));
    }

    #[tokio::test]
    async fn array_length() {
        let out = ArrayLength
            .execute(ctx(&[("array", numbers(&[1.0, 2.0, 3.0, 4.0]))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["length"], Value::Number(4.0));
    }
}
