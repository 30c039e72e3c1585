use crate::graph::NodeId;
use thiserror::Error;

/// Errors raised by an individual node handler during dispatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("invalid input type for '{port}': expected {expected}")]
    InvalidInputType { port: String, expected: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("unknown node type: {0}")]
    UnknownType(String),

    #[error("unresolved input '{port}': source result has no output '{handle}'")]
    UnresolvedInput { port: String, handle: String },

    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Errors detected while linearizing a graph, before any node runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("edge references unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("graph contains a cycle; {} node(s) could not be ordered: {unordered:?}", .unordered.len())]
    Cycle { unordered: Vec<NodeId> },
}

/// Top-level engine errors surfaced by the run controller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("no RPC endpoint configured")]
    MissingEndpoint,

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("node {node_id} failed: {source}")]
    NodeFailed { node_id: NodeId, source: NodeError },
}
