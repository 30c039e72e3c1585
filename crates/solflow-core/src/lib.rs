//! Core abstractions for the solflow engine
//!
//! This crate provides the graph model, the dynamic value type, the node
//! handler trait, the shared execution context and the Solana wire
//! primitives that every other component depends on.

mod context;
mod error;
pub mod events;
mod graph;
mod node;
pub mod rpc;
pub mod solana;
mod value;

pub use context::{ExecutionContext, WalletIdentity, WalletSigner};
pub use error::{EngineError, GraphError, NodeError};
pub use events::{EventBus, EventEmitter, LogLevel, RunEvent, RunId};
pub use graph::{Graph, GraphEdge, GraphNode, NodeId, Position};
pub use node::{DataType, Node, NodeContext, NodeOutput, NodePorts, Port};
pub use value::Value;
