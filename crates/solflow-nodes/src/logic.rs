use async_trait::async_trait;
use solflow_core::{DataType, Node, NodeContext, NodeError, NodeOutput, NodePorts, Port, Value};

/// Compares two values and emits all three verdicts at once. Equality is
/// structural; the orderings compare numerically.
pub struct Compare;

#[async_trait]
impl Node for Compare {
    fn node_type(&self) -> &str {
        "logic-compare"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("a", "A", DataType::Any).required())
            .input(Port::new("b", "B", DataType::Any).required())
            .output(Port::new("equal", "Equal", DataType::Boolean))
            .output(Port::new("greater", "A > B", DataType::Boolean))
            .output(Port::new("less", "A < B", DataType::Boolean))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let a = ctx.input("a").cloned().unwrap_or(Value::Null);
        let b = ctx.input("b").cloned().unwrap_or(Value::Null);
        Ok(NodeOutput::new()
            .with("equal", a == b)
            .with("greater", a.to_number() > b.to_number())
            .with("less", a.to_number() < b.to_number()))
    }
}

fn boolean_binary_ports() -> NodePorts {
    NodePorts::new()
        .input(Port::new("a", "A", DataType::Boolean).required())
        .input(Port::new("b", "B", DataType::Boolean).required())
        .output(Port::new("result", "Result", DataType::Boolean))
}

pub struct And;

#[async_trait]
impl Node for And {
    fn node_type(&self) -> &str {
        "logic-and"
    }

    fn ports(&self) -> NodePorts {
        boolean_binary_ports()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("result", ctx.truthy("a") && ctx.truthy("b")))
    }
}

pub struct Or;

#[async_trait]
impl Node for Or {
    fn node_type(&self) -> &str {
        "logic-or"
    }

    fn ports(&self) -> NodePorts {
        boolean_binary_ports()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("result", ctx.truthy("a") || ctx.truthy("b")))
    }
}

pub struct Not;

#[async_trait]
impl Node for Not {
    fn node_type(&self) -> &str {
        "logic-not"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("a", "Input", DataType::Boolean).required())
            .output(Port::new("result", "Result", DataType::Boolean))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with("result", !ctx.truthy("a")))
    }
}

/// Selects between two values based on a condition.
pub struct Switch;

#[async_trait]
impl Node for Switch {
    fn node_type(&self) -> &str {
        "logic-switch"
    }

    fn ports(&self) -> NodePorts {
        NodePorts::new()
            .input(Port::new("condition", "Condition", DataType::Boolean).required())
            .input(Port::new("trueValue", "If True", DataType::Any).required())
            .input(Port::new("falseValue", "If False", DataType::Any).required())
            .output(Port::new("result", "Result", DataType::Any))
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let chosen = if ctx.truthy("condition") {
            ctx.input("trueValue")
        } else {
            ctx.input("falseValue")
        };
        Ok(NodeOutput::new().with("result", chosen.cloned().unwrap_or(Value::Null)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx;

    #[tokio::test]
    async fn compare_emits_all_three_verdicts() {
        let out = Compare
            .execute(ctx(&[("a", Value::Number(3.0)), ("b", Value::Number(2.0))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["equal"], Value::Bool(false));
        assert_eq!(out.outputs["greater"], Value::Bool(true));
        assert_eq!(out.outputs["less"], Value::Bool(false));
    }

    #[tokio::test]
    async fn compare_equal_values() {
        let out = Compare
            .execute(ctx(&[("a", Value::from("x")), ("b", Value::from("x"))]))
            .await
            .unwrap();
        assert_eq!(out.outputs["equal"], Value::Bool(true));
    }

    #[tokio::test]
    async fn and_or_not() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);

        let out = And
            .execute(ctx(&[("a", t.clone()), ("b", f.clone())]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::Bool(false));

        let out = Or
            .execute(ctx(&[("a", t.clone()), ("b", f.clone())]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::Bool(true));

        let out = Not.execute(ctx(&[("a", f)])).await.unwrap();
        assert_eq!(out.outputs["result"], Value::Bool(true));
    }

    #[tokio::test]
    async fn switch_picks_by_condition() {
        let out = Switch
            .execute(ctx(&[
                ("condition", Value::Bool(true)),
                ("trueValue", Value::from("yes")),
                ("falseValue", Value::from("no")),
            ]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::from("yes"));

        let out = Switch
            .execute(ctx(&[
                ("condition", Value::Number(0.0)),
                ("trueValue", Value::from("yes")),
                ("falseValue", Value::from("no")),
            ]))
            .await
            .unwrap();
        assert_eq!(out.outputs["result"], Value::from("no"));
    }
}
