use crate::context::ExecutionContext;
use crate::events::EventEmitter;
use crate::graph::NodeId;
use crate::solana::{Instruction, Pubkey, Transaction};
use crate::{NodeError, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A node-type handler: a pure mapping from resolved inputs and the shared
/// execution context to named outputs. One handler per registered type,
/// no state of its own.
#[async_trait]
pub trait Node: Send + Sync {
    /// Type identifier, the registry key (e.g. "get-balance", "math-add").
    fn node_type(&self) -> &str;

    /// Declared input/output ports. Consumed by the surrounding UI and by
    /// the resolver's declared-output fallback; dispatch itself only relies
    /// on the port ids matching the keys used in values and edge handles.
    fn ports(&self) -> NodePorts {
        NodePorts::default()
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError>;
}

/// Everything a handler sees for one dispatch: its resolved input map and
/// the run-scoped shared context.
pub struct NodeContext {
    pub node_id: NodeId,
    pub inputs: HashMap<String, Value>,
    pub context: Arc<ExecutionContext>,
    pub events: EventEmitter,
}

impl NodeContext {
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    pub fn require_input(&self, name: &str) -> Result<&Value, NodeError> {
        self.inputs
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    /// Loose numeric read: missing or non-numeric inputs coerce to 0.
    pub fn number(&self, name: &str) -> f64 {
        self.inputs.get(name).map(Value::to_number).unwrap_or(0.0)
    }

    /// Loose boolean read: missing inputs are falsy.
    pub fn truthy(&self, name: &str) -> bool {
        self.inputs.get(name).map(Value::truthy).unwrap_or(false)
    }

    pub fn require_str(&self, name: &str) -> Result<&str, NodeError> {
        self.require_input(name)?
            .as_str()
            .ok_or_else(|| NodeError::InvalidInputType {
                port: name.to_string(),
                expected: "string".to_string(),
            })
    }

    pub fn require_pubkey(&self, name: &str) -> Result<Pubkey, NodeError> {
        let raw = self
            .require_input(name)?
            .as_str()
            .ok_or_else(|| NodeError::InvalidInputType {
                port: name.to_string(),
                expected: "publickey".to_string(),
            })?;
        Pubkey::parse(raw)
    }

    pub fn require_array(&self, name: &str) -> Result<&[Value], NodeError> {
        self.require_input(name)?
            .as_array()
            .ok_or_else(|| NodeError::InvalidInputType {
                port: name.to_string(),
                expected: "array".to_string(),
            })
    }

    pub fn require_transaction(&self, name: &str) -> Result<&Transaction, NodeError> {
        self.require_input(name)?
            .as_transaction()
            .ok_or_else(|| NodeError::InvalidInputType {
                port: name.to_string(),
                expected: "transaction".to_string(),
            })
    }

    pub fn require_instruction(&self, name: &str) -> Result<&Instruction, NodeError> {
        self.require_input(name)?
            .as_instruction()
            .ok_or_else(|| NodeError::InvalidInputType {
                port: name.to_string(),
                expected: "instruction".to_string(),
            })
    }
}

/// Named output values from one dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutput {
    pub outputs: HashMap<String, Value>,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, port: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(port.into(), value.into());
        self
    }
}

/// Declared ports of a node type, in declaration order. The output order
/// matters: the resolver's loose fallback binds the first declared output
/// present on a recorded result.
#[derive(Debug, Clone, Default)]
pub struct NodePorts {
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

impl NodePorts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }
}

/// A named, typed slot on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl Port {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type,
            required: false,
            default_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Semantic data type of a port. Advisory: the engine does not validate
/// port compatibility at graph-build time; mismatches surface at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Any,
    String,
    Number,
    Boolean,
    Publickey,
    Transaction,
    Instruction,
    Connection,
    Account,
    #[serde(rename = "tokenAccount")]
    TokenAccount,
    Array,
    Object,
}
